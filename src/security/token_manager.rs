//! Secure token resolution for registry uploads
//!
//! Tokens are looked up from three sources in a fixed order and kept in
//! `secrecy` wrappers so they cannot end up in logs by accident. Only the
//! *source* of a token is ever reported.

use crate::core::config::{RegistryTarget, ReleaseConfig};
use crate::core::error::ReleaseError;
use crate::security::pypirc;
use secrecy::SecretString;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Where a token was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Registry-specific environment variable
    RegistryEnv(String),
    /// `password` of a credential file section
    CredentialFile { path: PathBuf, section: String },
    /// Environment variable shared by every registry
    FallbackEnv(String),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::RegistryEnv(name) | TokenSource::FallbackEnv(name) => {
                write!(f, "${}", name)
            }
            TokenSource::CredentialFile { path, section } => {
                write!(f, "[{}] password in {}", section, path.display())
            }
        }
    }
}

/// A token together with the source it came from
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub secret: SecretString,
    pub source: TokenSource,
}

/// Resolves upload tokens for registry targets
///
/// # Examples
///
/// ```
/// use release_publisher::core::config::RegistryTarget;
/// use release_publisher::security::SecureTokenManager;
/// use std::collections::HashMap;
///
/// let env = HashMap::from([("TESTPYPI_TOKEN".to_string(), "pypi-abc".to_string())]);
/// let manager = SecureTokenManager::new(env, "/nonexistent/.pypirc", "UV_PUBLISH_TOKEN");
/// assert!(manager.resolve(&RegistryTarget::testpypi()).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct SecureTokenManager {
    env: HashMap<String, String>,
    pypirc_path: PathBuf,
    fallback_env: String,
}

impl SecureTokenManager {
    pub fn new<P: Into<PathBuf>>(
        env: HashMap<String, String>,
        pypirc_path: P,
        fallback_env: impl Into<String>,
    ) -> Self {
        Self {
            env,
            pypirc_path: pypirc_path.into(),
            fallback_env: fallback_env.into(),
        }
    }

    /// Manager for a resolved config; `~/.pypirc` unless configured otherwise
    pub fn from_config(config: &ReleaseConfig, env: HashMap<String, String>) -> Self {
        let pypirc_path = config.pypirc.clone().unwrap_or_else(default_pypirc_path);
        Self::new(env, pypirc_path, config.fallback_token_env.clone())
    }

    pub fn pypirc_path(&self) -> &std::path::Path {
        &self.pypirc_path
    }

    fn env_value(&self, name: &str) -> Option<SecretString> {
        self.env
            .get(name)
            .filter(|value| !value.is_empty())
            .map(|value| SecretString::from(value.clone()))
    }

    /// The sources tried for `target`, in lookup order
    pub fn sources(&self, target: &RegistryTarget) -> [TokenSource; 3] {
        [
            TokenSource::RegistryEnv(target.token_env.clone()),
            TokenSource::CredentialFile {
                path: self.pypirc_path.clone(),
                section: target.pypirc_section.clone(),
            },
            TokenSource::FallbackEnv(self.fallback_env.clone()),
        ]
    }

    /// First non-empty token for `target`
    pub fn resolve(&self, target: &RegistryTarget) -> Option<ResolvedToken> {
        for source in self.sources(target) {
            let secret = match &source {
                TokenSource::RegistryEnv(name) | TokenSource::FallbackEnv(name) => {
                    self.env_value(name)
                }
                TokenSource::CredentialFile { path, section } => {
                    pypirc::read_password(path, section)
                }
            };

            match secret {
                Some(secret) => {
                    tracing::debug!(registry = %target.name, %source, "token resolved");
                    return Some(ResolvedToken { secret, source });
                }
                None => tracing::debug!(registry = %target.name, %source, "no token"),
            }
        }

        None
    }

    /// Like [`resolve`](Self::resolve), failing with every source named
    pub fn require(&self, target: &RegistryTarget) -> Result<ResolvedToken, ReleaseError> {
        self.resolve(target)
            .ok_or_else(|| ReleaseError::TokenMissing {
                registry: target.name.clone(),
                sources: self.sources(target).iter().map(ToString::to_string).collect(),
            })
    }
}

/// `~/.pypirc`, or `.pypirc` when there is no home directory
pub fn default_pypirc_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".pypirc"))
        .unwrap_or_else(|| PathBuf::from(".pypirc"))
}
