//! Manifest access - reads and rewrites the version line of `pyproject.toml`
//!
//! The manifest is treated as text: only the first `version = "X.Y.Z"` line is
//! touched and every other byte of the file is preserved. The file is read
//! fresh on every call and never cached.

use crate::core::error::ReleaseError;
use crate::validation::version_validator::Version;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(version\s*=\s*")(\d+)\.(\d+)\.(\d+)(")"#).expect("valid version regex")
});

/// Find the first `version = "X.Y.Z"` line in manifest text
pub fn find_version(text: &str) -> Option<Version> {
    let caps = VERSION_LINE.captures(text)?;
    Some(Version::new(
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
        caps[4].parse().ok()?,
    ))
}

/// Replace the first version line, `None` when there is no such line
pub fn replace_version(text: &str, version: Version) -> Option<String> {
    if !VERSION_LINE.is_match(text) {
        return None;
    }
    let replaced = VERSION_LINE.replacen(text, 1, |caps: &Captures| {
        format!("{}{}{}", &caps[1], version, &caps[5])
    });
    Some(replaced.into_owned())
}

/// The project manifest holding the release version
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, ReleaseError> {
        fs::read_to_string(&self.path)
            .await
            .map_err(|source| ReleaseError::Manifest {
                path: self.path.clone(),
                source,
            })
    }

    /// Current version, `None` when the manifest has no version line
    pub async fn current_version(&self) -> Result<Option<Version>, ReleaseError> {
        Ok(find_version(&self.read().await?))
    }

    /// Current version, failing when absent
    pub async fn require_version(&self) -> Result<Version, ReleaseError> {
        self.current_version()
            .await?
            .ok_or_else(|| ReleaseError::VersionNotFound {
                manifest: self.path.clone(),
            })
    }

    /// Rewrite the version line in place
    ///
    /// Writes to a temporary sibling and renames it over the manifest.
    pub async fn set_version(&self, version: Version) -> Result<(), ReleaseError> {
        let text = self.read().await?;
        let updated = replace_version(&text, version).ok_or_else(|| {
            ReleaseError::VersionNotFound {
                manifest: self.path.clone(),
            }
        })?;

        let temp_file = self.path.with_extension("toml.tmp");
        let io_err = |source: std::io::Error| ReleaseError::Manifest {
            path: self.path.clone(),
            source,
        };
        fs::write(&temp_file, updated).await.map_err(io_err)?;
        fs::rename(&temp_file, &self.path).await.map_err(io_err)?;

        tracing::debug!(manifest = %self.path.display(), %version, "manifest version updated");
        Ok(())
    }

    /// `[project].name`, if the manifest is valid TOML and declares one
    pub async fn package_name(&self) -> Option<String> {
        let text = self.read().await.ok()?;
        let value: toml::Table = match toml::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "manifest is not valid TOML");
                return None;
            }
        };
        value
            .get("project")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string)
    }
}
