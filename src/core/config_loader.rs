//! Configuration file loader for release-publisher
//!
//! This module provides configuration loading, validation, and merging capabilities.

use super::config::*;
use crate::core::error::ReleaseError;
use crate::security::command_executor::ensure_allowed;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".release-config.yaml";

/// Overrides the credential file location
pub const PYPIRC_PATH_ENV: &str = "PYPIRC_PATH";

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// Explicit config file; must exist when given
    pub config_path: Option<PathBuf>,

    /// Home directory for the global config and `~/` expansion
    pub home_dir: Option<PathBuf>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

impl ConfigLoadOptions {
    /// Options for the current process environment
    pub fn from_process<P: AsRef<Path>>(project_path: P, config_path: Option<PathBuf>) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
            config_path,
            home_dir: dirs::home_dir(),
            env: process_env(),
        }
    }
}

/// Process environment, skipping entries that are not valid UTF-8
fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. Environment variables
    /// 2. Project config (./.release-config.yaml or --config)
    /// 3. Global config (~/.release-config.yaml)
    /// 4. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<ReleaseConfig, ReleaseError> {
        let mut config = ReleaseConfig::default();

        if let Some(home) = &options.home_dir
            && let Some(global) = Self::load_config_file(&home.join(CONFIG_FILENAME)).await?
        {
            tracing::debug!(path = %home.join(CONFIG_FILENAME).display(), "applying global config");
            Self::merge_into(&mut config, global);
        }

        let project_file = match &options.config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    options.project_path.join(path)
                };
                let file = Self::load_config_file(&path).await?;
                Some(file.ok_or_else(|| ReleaseError::Config {
                    message: format!("config file not found: {}", path.display()),
                })?)
            }
            None => Self::load_config_file(&options.project_path.join(CONFIG_FILENAME)).await?,
        };
        if let Some(project) = project_file {
            Self::merge_into(&mut config, project);
        }

        if let Some(path) = options.env.get(PYPIRC_PATH_ENV).filter(|p| !p.is_empty()) {
            config.pypirc = Some(PathBuf::from(path));
        }

        config.pypirc = config
            .pypirc
            .map(|path| expand_home(&path, options.home_dir.as_deref()));

        let issues = Self::validate(&config);
        if !issues.is_empty() {
            return Err(ReleaseError::Config {
                message: issues.join("; "),
            });
        }

        Ok(config)
    }

    /// Load configuration from a YAML file, `None` if it does not exist
    async fn load_config_file(file_path: &Path) -> Result<Option<ConfigFile>, ReleaseError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path)
            .await
            .map_err(|e| ReleaseError::Config {
                message: format!("failed to read {}: {}", file_path.display(), e),
            })?;

        // An empty file deserializes to unit, not to a map
        if content.trim().is_empty() {
            return Ok(Some(ConfigFile::default()));
        }

        let file: ConfigFile = serde_yaml::from_str(&content).map_err(|e| ReleaseError::Config {
            message: format!("failed to parse {}: {}", file_path.display(), e),
        })?;

        Ok(Some(file))
    }

    /// Merge source config into target
    fn merge_into(target: &mut ReleaseConfig, source: ConfigFile) {
        if let Some(manifest) = source.manifest {
            target.manifest = manifest;
        }
        if let Some(dist_dir) = source.dist_dir {
            target.dist_dir = dist_dir;
        }
        if source.pypirc.is_some() {
            target.pypirc = source.pypirc;
        }
        if let Some(name) = source.fallback_token_env {
            target.fallback_token_env = name;
        }
        if let Some(name) = source.publish_token_env {
            target.publish_token_env = name;
        }

        if let Some(commands) = source.commands {
            let target_commands = &mut target.commands;
            if let Some(lint) = commands.lint {
                target_commands.lint = lint;
            }
            if let Some(typecheck) = commands.typecheck {
                target_commands.typecheck = typecheck;
            }
            if let Some(build) = commands.build {
                target_commands.build = build;
            }
            if let Some(publish) = commands.publish {
                target_commands.publish = publish;
            }
        }

        if let Some(registries) = source.registries {
            if let Some(staging) = registries.staging {
                Self::merge_target(&mut target.registries.staging, staging);
            }
            if let Some(production) = registries.production {
                Self::merge_target(&mut target.registries.production, production);
            }
        }
    }

    fn merge_target(target: &mut RegistryTarget, source: RegistryTargetFile) {
        if let Some(name) = source.name {
            target.name = name;
        }
        if let Some(url) = source.publish_url {
            target.publish_url = url;
        }
        if let Some(url) = source.index_url {
            target.index_url = url;
        }
        if let Some(env) = source.token_env {
            target.token_env = env;
        }
        if let Some(section) = source.pypirc_section {
            target.pypirc_section = section;
        }
    }

    /// Validate configuration, returning one message per problem
    pub fn validate(config: &ReleaseConfig) -> Vec<String> {
        let mut issues = Vec::new();

        let commands = [
            ("commands.lint", &config.commands.lint),
            ("commands.typecheck", &config.commands.typecheck),
            ("commands.build", &config.commands.build),
            ("commands.publish", &config.commands.publish),
        ];
        for (field, argv) in commands {
            match argv.first() {
                None => issues.push(format!("{} must not be empty", field)),
                Some(program) => {
                    if let Err(e) = ensure_allowed(program) {
                        issues.push(format!("{}: {}", field, e));
                    }
                }
            }
        }

        for (field, target) in [
            ("registries.staging", &config.registries.staging),
            ("registries.production", &config.registries.production),
        ] {
            if target.publish_url.is_empty() {
                issues.push(format!("{}.publishUrl must not be empty", field));
            }
            if target.token_env.is_empty() {
                issues.push(format!("{}.tokenEnv must not be empty", field));
            }
        }

        if config.publish_token_env.is_empty() {
            issues.push("publishTokenEnv must not be empty".to_string());
        }

        issues
    }
}

/// Expand a leading `~/` using the given home directory
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(project: &Path, home: &Path) -> ConfigLoadOptions {
        ConfigLoadOptions {
            project_path: project.to_path_buf(),
            config_path: None,
            home_dir: Some(home.to_path_buf()),
            env: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_load_defaults_without_files() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let config = ConfigLoader::load(options(project.path(), home.path()))
            .await
            .unwrap();

        assert_eq!(config, ReleaseConfig::default());
    }

    #[tokio::test]
    async fn test_project_overrides_global() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join(CONFIG_FILENAME),
            "distDir: global-dist\nfallbackTokenEnv: GLOBAL_TOKEN\n",
        )
        .unwrap();
        std::fs::write(project.path().join(CONFIG_FILENAME), "distDir: project-dist\n").unwrap();

        let config = ConfigLoader::load(options(project.path(), home.path()))
            .await
            .unwrap();

        assert_eq!(config.dist_dir, PathBuf::from("project-dist"));
        assert_eq!(config.fallback_token_env, "GLOBAL_TOKEN");
    }

    #[tokio::test]
    async fn test_env_pypirc_path_wins() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(project.path().join(CONFIG_FILENAME), "pypirc: /etc/pypirc\n").unwrap();

        let mut opts = options(project.path(), home.path());
        opts.env
            .insert(PYPIRC_PATH_ENV.to_string(), "/tmp/custom-pypirc".to_string());

        let config = ConfigLoader::load(opts).await.unwrap();
        assert_eq!(config.pypirc, Some(PathBuf::from("/tmp/custom-pypirc")));
    }

    #[tokio::test]
    async fn test_pypirc_home_expansion() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(project.path().join(CONFIG_FILENAME), "pypirc: ~/.config/pypirc\n").unwrap();

        let config = ConfigLoader::load(options(project.path(), home.path()))
            .await
            .unwrap();

        assert_eq!(config.pypirc, Some(home.path().join(".config/pypirc")));
    }

    #[tokio::test]
    async fn test_explicit_config_must_exist() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let mut opts = options(project.path(), home.path());
        opts.config_path = Some(PathBuf::from("missing.yaml"));

        let err = ConfigLoader::load(opts).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Config { .. }));
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[tokio::test]
    async fn test_non_whitelisted_command_is_rejected() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(
            project.path().join(CONFIG_FILENAME),
            "commands:\n  build: [\"bash\", \"-c\", \"make dist\"]\n",
        )
        .unwrap();

        let err = ConfigLoader::load(options(project.path(), home.path()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("commands.build"));
        assert!(err.to_string().contains("bash"));
    }

    #[tokio::test]
    async fn test_empty_file_is_ignored() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(project.path().join(CONFIG_FILENAME), "\n").unwrap();

        let config = ConfigLoader::load(options(project.path(), home.path()))
            .await
            .unwrap();
        assert_eq!(config, ReleaseConfig::default());
    }

    #[test]
    fn test_merge_registry_target() {
        let mut config = ReleaseConfig::default();
        let file = ConfigFile {
            registries: Some(RegistriesFile {
                staging: Some(RegistryTargetFile {
                    publish_url: Some("https://pypi.internal/legacy/".to_string()),
                    ..Default::default()
                }),
                production: None,
            }),
            ..Default::default()
        };

        ConfigLoader::merge_into(&mut config, file);

        assert_eq!(
            config.registries.staging.publish_url,
            "https://pypi.internal/legacy/"
        );
        assert_eq!(config.registries.staging.token_env, "TESTPYPI_TOKEN");
        assert_eq!(config.registries.production, RegistryTarget::pypi());
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = ReleaseConfig::default();
        config.commands.lint.clear();

        let issues = ConfigLoader::validate(&config);
        assert_eq!(issues, vec!["commands.lint must not be empty".to_string()]);
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/dev");
        assert_eq!(
            expand_home(Path::new("~/.pypirc"), Some(home)),
            PathBuf::from("/home/dev/.pypirc")
        );
        assert_eq!(
            expand_home(Path::new("/etc/pypirc"), Some(home)),
            PathBuf::from("/etc/pypirc")
        );
        assert_eq!(
            expand_home(Path::new("~/.pypirc"), None),
            PathBuf::from("~/.pypirc")
        );
    }
}
