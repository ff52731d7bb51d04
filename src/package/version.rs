//! Version ordering for package instances.
//!
//! The deployment engine only ever asks one question of versions: is this
//! one strictly newer than that one. [`VersionCompare`] is that seam;
//! [`RockVersionCompare`] orders rock-style versions such as `1.8.0-1`.

use std::cmp::Ordering;

#[cfg_attr(test, mockall::automock)]
pub trait VersionCompare {
    /// True iff `a` is strictly newer than `b`.
    fn is_newer(&self, a: &str, b: &str) -> bool;
}

/// Orders `<dotted version>-<revision>` strings.
///
/// Dotted parts compare numerically, with any alphabetic tail (`0rc1`)
/// ranking below the bare number. Missing parts count as zero. The
/// development versions `scm` and `dev` rank above every release.
#[derive(Debug, Default, Clone, Copy)]
pub struct RockVersionCompare;

impl VersionCompare for RockVersionCompare {
    fn is_newer(&self, a: &str, b: &str) -> bool {
        RockVersion::parse(a) > RockVersion::parse(b)
    }
}

#[derive(Debug)]
struct RockVersion {
    development: bool,
    parts: Vec<VersionPart>,
    revision: u64,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
struct VersionPart {
    number: u64,
    tail: String,
}

impl RockVersion {
    fn parse(version: &str) -> Self {
        let (main, revision) = match version.rsplit_once('-') {
            Some((main, rev)) if !rev.is_empty() && rev.chars().all(|c| c.is_ascii_digit()) => {
                (main, rev.parse().unwrap_or(0))
            }
            _ => (version, 0),
        };

        let development = matches!(main, "scm" | "dev");
        let parts = if development {
            Vec::new()
        } else {
            main.split('.').map(VersionPart::parse).collect()
        };

        RockVersion {
            development,
            parts,
            revision,
        }
    }
}

impl VersionPart {
    fn parse(part: &str) -> Self {
        let digits = part.chars().take_while(|c| c.is_ascii_digit()).count();
        VersionPart {
            number: part[..digits].parse().unwrap_or(0),
            tail: part[digits..].to_string(),
        }
    }
}

impl Ord for VersionPart {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| match (self.tail.is_empty(), other.tail.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.tail.cmp(&other.tail),
            })
    }
}

impl PartialOrd for VersionPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RockVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.development, other.development) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }

        let len = self.parts.len().max(other.parts.len());
        let zero = VersionPart::default();
        for i in 0..len {
            let a = self.parts.get(i).unwrap_or(&zero);
            let b = other.parts.get(i).unwrap_or(&zero);
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        self.revision.cmp(&other.revision)
    }
}

impl PartialEq for RockVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RockVersion {}

impl PartialOrd for RockVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newer(a: &str, b: &str) -> bool {
        RockVersionCompare.is_newer(a, b)
    }

    #[test]
    fn test_numeric_parts() {
        assert!(newer("2.0", "1.0"));
        assert!(newer("1.10", "1.9"));
        assert!(!newer("1.0", "2.0"));
    }

    #[test]
    fn test_equal_is_not_newer() {
        assert!(!newer("1.0-1", "1.0-1"));
        assert!(!newer("1.0", "1.0.0"));
    }

    #[test]
    fn test_revision_breaks_ties() {
        assert!(newer("1.0-2", "1.0-1"));
        assert!(!newer("1.0-1", "1.0-2"));
        assert!(newer("1.1-1", "1.0-9"));
    }

    #[test]
    fn test_missing_parts_are_zero() {
        assert!(newer("1.0.1", "1.0"));
        assert!(!newer("1.0", "1.0.1"));
    }

    #[test]
    fn test_prerelease_tail_ranks_below_release() {
        assert!(newer("1.0", "1.0rc1"));
        assert!(newer("1.0rc2", "1.0rc1"));
    }

    #[test]
    fn test_development_versions_rank_highest() {
        assert!(newer("scm-1", "99.0-1"));
        assert!(newer("dev-1", "1.0-1"));
        assert!(!newer("1.0-1", "scm-1"));
    }
}
