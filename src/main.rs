use anyhow::Result;
use clap::Parser;
use rockyard::config::DeployConfig;
use std::path::PathBuf;

/// rockyard - local rocks tree manager
///
/// Deploys installed package versions into the shared command and module
/// directories of a rocks tree, and removes them again.
///
/// Examples:
///   rockyard deploy luasocket 3.1.0-1   # Deploy an installed version
///   rockyard list                       # List installed versions
#[derive(Parser, Debug)]
#[command(author, version = env!("ROCKYARD_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository root directory (overrides defaults; also via ROCKYARD_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "ROCKYARD_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// Deploy directory for commands (defaults to <root>/bin)
    #[arg(long = "bin-dir", value_name = "PATH", global = true)]
    pub bin_dir: Option<PathBuf>,

    /// Deploy directory for source modules (defaults to <root>/share/lua)
    #[arg(long = "lua-dir", value_name = "PATH", global = true)]
    pub lua_dir: Option<PathBuf>,

    /// Deploy directory for compiled modules (defaults to <root>/lib/lua)
    #[arg(long = "lib-dir", value_name = "PATH", global = true)]
    pub lib_dir: Option<PathBuf>,

    /// Interpreter that command launchers run scripts with
    #[arg(
        long = "interpreter",
        env = "ROCKYARD_LUA",
        value_name = "PROGRAM",
        global = true
    )]
    pub interpreter: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Deploy an installed package version into the tree
    Deploy(InstanceArgs),

    /// Undeploy a package version and delete its install directory
    #[command(alias = "rm")]
    Remove(InstanceArgs),

    /// List installed package versions
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show the modules and commands of an installed version
    Show(InstanceArgs),
}

#[derive(clap::Args, Debug)]
pub struct InstanceArgs {
    /// Package name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Installed version, e.g. 1.0-1
    #[arg(value_name = "VERSION")]
    pub version: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only list versions of this package
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = rockyard::runtime::RealRuntime;

    let config = DeployConfig::resolve(
        &runtime,
        cli.root,
        cli.bin_dir,
        cli.lua_dir,
        cli.lib_dir,
        cli.interpreter,
    )?;

    match cli.command {
        Commands::Deploy(args) => {
            rockyard::commands::deploy(runtime, &args.name, &args.version, config)?
        }
        Commands::Remove(args) => {
            rockyard::commands::remove(runtime, &args.name, &args.version, config)?
        }
        Commands::List(args) => rockyard::commands::list(runtime, args.name.as_deref(), config)?,
        Commands::Show(args) => {
            rockyard::commands::show(runtime, &args.name, &args.version, config)?
        }
    }
    Ok(())
}
