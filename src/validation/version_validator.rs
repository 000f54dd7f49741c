//! Version Validator - release version triples and bumping
//!
//! Release versions are plain `MAJOR.MINOR.PATCH` triples of non-negative
//! integers. Pre-release and build suffixes are not accepted.
//!
//! # Example
//!
//! ```
//! use release_publisher::validation::version_validator::{BumpKind, Version};
//!
//! let current: Version = "1.2.3".parse().unwrap();
//! assert_eq!(current.bump(BumpKind::Minor).unwrap().to_string(), "1.3.0");
//! ```

use crate::core::error::ReleaseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which component of the version to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

/// A `MAJOR.MINOR.PATCH` release version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Return the version after applying `kind`
    ///
    /// Lower components are reset to zero. Fails when the bumped component
    /// does not fit in a `u64`.
    pub fn bump(&self, kind: BumpKind) -> Result<Self, ReleaseError> {
        let overflow = || ReleaseError::BumpOverflow {
            version: self.to_string(),
            kind: kind.as_str().to_string(),
        };
        let bumped = match kind {
            BumpKind::Major => Self::new(self.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            BumpKind::Minor => Self::new(
                self.major,
                self.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            BumpKind::Patch => Self::new(
                self.major,
                self.minor,
                self.patch.checked_add(1).ok_or_else(overflow)?,
            ),
        };
        Ok(bumped)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parsed with `semver`; pre-release and build metadata are rejected
impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = semver::Version::parse(s).map_err(|_| ReleaseError::InvalidVersion {
            value: s.to_string(),
        })?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaseError::InvalidVersion {
                value: s.to_string(),
            });
        }
        Ok(Version::new(parsed.major, parsed.minor, parsed.patch))
    }
}

/// Bump a version string
///
/// When `current` is not a valid triple, or the bump overflows, it is
/// returned unchanged.
pub fn bump_version_str(current: &str, kind: BumpKind) -> String {
    match current.parse::<Version>().and_then(|version| version.bump(kind)) {
        Ok(bumped) => bumped.to_string(),
        Err(e) => {
            tracing::warn!(current, bump = kind.as_str(), error = %e, "not bumping");
            current.to_string()
        }
    }
}
