pub mod application;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod error;
pub mod package;
pub mod runtime;
