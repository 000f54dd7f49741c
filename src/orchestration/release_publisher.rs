//! Release Publisher - main orchestrator for a release run
//!
//! Runs the release pipeline in a fixed order:
//! - Version resolution (explicit, bumped or prompted) and manifest update
//! - Removal of the build output directory
//! - Lint with auto-fix, type check and build
//! - Upload to the staging registry and the install hint
//! - Upload to the production registry, forced or confirmed
//!
//! Every step is awaited before the next one starts and the first failure
//! ends the run. Nothing is retried or rolled back.

use crate::core::config::{RegistryKind, ReleaseConfig};
use crate::core::error::ReleaseError;
use crate::core::state_machine::{ReleaseState, ReleaseStateMachine};
use crate::core::traits::{CommandInvocation, CommandRunner, InputSource};
use crate::orchestration::registry::{publish_invocation, verify_hint};
use crate::security::token_manager::SecureTokenManager;
use crate::validation::{BumpKind, Manifest, Version};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use walkdir::WalkDir;

/// Release options passed from the CLI
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Bump the current version
    pub bump: Option<BumpKind>,

    /// Use this exact version
    pub set_version: Option<String>,

    /// Do not upload to the staging registry
    pub skip_staging: bool,

    /// Do not print the staging install hint
    pub skip_verify: bool,

    /// Upload to production without asking
    pub publish_production: bool,
}

/// How the release version is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRequest {
    Explicit(Version),
    Bump(BumpKind),
    Prompt,
}

impl ReleaseOptions {
    /// Check the version options without touching anything
    pub fn version_request(&self) -> Result<VersionRequest, ReleaseError> {
        match (&self.set_version, self.bump) {
            (Some(_), Some(_)) => Err(ReleaseError::ConflictingVersionOptions),
            (Some(value), None) => Ok(VersionRequest::Explicit(value.trim().parse()?)),
            (None, Some(kind)) => Ok(VersionRequest::Bump(kind)),
            (None, None) => Ok(VersionRequest::Prompt),
        }
    }
}

/// Release report returned after a run
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub package_name: String,
    pub previous_version: Version,
    pub version: Version,
    /// File names found in the build output directory
    pub artifacts: Vec<String>,
    /// Registries uploaded to, in order
    pub published: Vec<String>,
    pub production_skipped: bool,
    pub duration: u64,
    pub state: ReleaseState,
    pub history: String,
}

/// Main release orchestrator
pub struct ReleasePublisher<R, I> {
    project_path: PathBuf,
    config: ReleaseConfig,
    runner: R,
    input: I,
    tokens: SecureTokenManager,
    state_machine: ReleaseStateMachine,
}

impl<R: CommandRunner, I: InputSource> ReleasePublisher<R, I> {
    /// Create a new ReleasePublisher
    ///
    /// # Arguments
    ///
    /// * `project_path` - Directory holding the manifest
    /// * `runner` - Runs the external tools
    /// * `input` - Answers interactive prompts
    /// * `tokens` - Resolves registry credentials
    pub fn new<P: AsRef<Path>>(
        project_path: P,
        config: ReleaseConfig,
        runner: R,
        input: I,
        tokens: SecureTokenManager,
    ) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
            config,
            runner,
            input,
            tokens,
            state_machine: ReleaseStateMachine::new(),
        }
    }

    pub fn state(&self) -> ReleaseState {
        self.state_machine.state()
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::new(self.project_path.join(&self.config.manifest))
    }

    /// Run the release
    ///
    /// On error the run is marked failed and the error returned unchanged.
    pub async fn release(&mut self, options: ReleaseOptions) -> Result<ReleaseReport, ReleaseError> {
        match self.run(options).await {
            Ok(report) => Ok(report),
            Err(e) => {
                if !self.state_machine.state().is_terminal() {
                    self.state_machine
                        .transition(ReleaseState::Failed, Some(e.code().to_string()))?;
                }
                tracing::debug!(code = e.code(), history = %self.state_machine.history(), "release failed");
                Err(e)
            }
        }
    }

    async fn run(&mut self, options: ReleaseOptions) -> Result<ReleaseReport, ReleaseError> {
        let start_time = Instant::now();

        // Reject bad flags before anything is touched
        let request = options.version_request()?;

        // 1. Version
        let manifest = self.manifest();
        let previous_version = manifest.require_version().await?;
        println!("📦 Current version: {}", previous_version);

        let target = match request {
            VersionRequest::Explicit(version) => version,
            VersionRequest::Bump(kind) => previous_version.bump(kind)?,
            VersionRequest::Prompt => self.prompt_version(previous_version).await?,
        };

        if target < previous_version {
            tracing::warn!(%previous_version, %target, "version goes backwards");
            println!(
                "⚠️  {} is lower than the current version {}",
                target, previous_version
            );
        }

        if target != previous_version {
            manifest.set_version(target).await?;
        }
        let version = manifest.require_version().await?;
        println!("✅ Effective version: {}\n", version);
        self.state_machine
            .transition(ReleaseState::VersionResolved, Some(version.to_string()))?;

        // 2. Clean
        self.clean_dist().await?;
        self.state_machine.transition(ReleaseState::Cleaned, None)?;

        // 3. Lint, type check, build
        let commands = self.config.commands.clone();
        self.run_step("lint", &commands.lint).await?;
        self.state_machine.transition(ReleaseState::Linted, None)?;

        self.run_step("type-check", &commands.typecheck).await?;
        self.state_machine.transition(ReleaseState::TypeChecked, None)?;

        self.run_step("build", &commands.build).await?;
        let artifacts = self.list_artifacts();
        println!("  Artifacts:");
        for artifact in &artifacts {
            println!("    - {}", artifact);
        }
        println!();
        self.state_machine
            .transition(ReleaseState::Built, Some(format!("{} artifacts", artifacts.len())))?;

        let package_name = self.package_name(&manifest).await;
        let mut published = Vec::new();

        // 4. Staging
        if options.skip_staging {
            println!("⏭️  Skipping {} upload\n", self.config.registries.staging.name);
        } else {
            let name = self.publish(RegistryKind::Staging).await?;
            self.state_machine
                .transition(ReleaseState::StagingPublished, Some(name.clone()))?;
            published.push(name);

            if !options.skip_verify {
                let registries = &self.config.registries;
                println!("🔍 Verify the upload in a clean environment:");
                println!(
                    "    {}\n",
                    verify_hint(&package_name, version, &registries.staging, &registries.production)
                );
                self.state_machine.transition(ReleaseState::VerifyHinted, None)?;
            }
        }

        // 5. Production
        let production_skipped =
            !(options.publish_production || self.confirm_production(version).await?);

        if production_skipped {
            let manual = publish_invocation(&commands.publish, &self.config.registries.production)?;
            println!(
                "⏭️  Skipped {} upload. To publish later run:",
                self.config.registries.production.name
            );
            println!("    {}\n", manual);
        } else {
            let name = self.publish(RegistryKind::Production).await?;
            self.state_machine
                .transition(ReleaseState::ProductionPublished, Some(name.clone()))?;
            published.push(name);
        }

        self.state_machine.transition(ReleaseState::Done, None)?;
        println!("🎉 Released {} {}", package_name, version);

        Ok(ReleaseReport {
            package_name,
            previous_version,
            version,
            artifacts,
            published,
            production_skipped,
            duration: start_time.elapsed().as_millis() as u64,
            state: self.state_machine.state(),
            history: self.state_machine.history(),
        })
    }

    /// Ask for a new version; blank input or end of input keeps `current`
    async fn prompt_version(&mut self, current: Version) -> Result<Version, ReleaseError> {
        let prompt = format!(
            "Current version is {}. Press Enter to keep it or type a new version: ",
            current
        );
        let answer = self
            .input
            .read_line(&prompt)
            .await
            .map_err(|source| ReleaseError::Io {
                action: "read the version answer".to_string(),
                source,
            })?;

        match answer.as_deref().map(str::trim) {
            None | Some("") => Ok(current),
            Some(value) => value.parse(),
        }
    }

    /// Only a case-insensitive `y` confirms
    async fn confirm_production(&mut self, version: Version) -> Result<bool, ReleaseError> {
        let prompt = format!(
            "Publish {} to {}? [y/N]: ",
            version, self.config.registries.production.name
        );
        let answer = self
            .input
            .read_line(&prompt)
            .await
            .map_err(|source| ReleaseError::Io {
                action: "read the publish confirmation".to_string(),
                source,
            })?;

        Ok(answer.is_some_and(|a| a.trim().eq_ignore_ascii_case("y")))
    }

    async fn clean_dist(&self) -> Result<(), ReleaseError> {
        let dist = self.project_path.join(&self.config.dist_dir);
        if !dist.exists() {
            return Ok(());
        }

        fs::remove_dir_all(&dist)
            .await
            .map_err(|source| ReleaseError::Io {
                action: format!("remove {}", dist.display()),
                source,
            })?;
        println!("🧹 Removed {}\n", self.config.dist_dir.display());
        Ok(())
    }

    fn list_artifacts(&self) -> Vec<String> {
        let dist = self.project_path.join(&self.config.dist_dir);
        let mut artifacts: Vec<String> = WalkDir::new(&dist)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&dist)
                    .ok()
                    .map(|p| p.display().to_string())
            })
            .collect();
        artifacts.sort();
        artifacts
    }

    async fn package_name(&self, manifest: &Manifest) -> String {
        if let Some(name) = manifest.package_name().await {
            return name;
        }
        fs::canonicalize(&self.project_path)
            .await
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "package".to_string())
    }

    async fn run_step(&self, step: &str, argv: &[String]) -> Result<(), ReleaseError> {
        let invocation = CommandInvocation::from_argv(argv).ok_or_else(|| ReleaseError::Config {
            message: format!("{} command must not be empty", step),
        })?;
        self.execute(step, &invocation).await
    }

    async fn execute(&self, step: &str, invocation: &CommandInvocation) -> Result<(), ReleaseError> {
        println!("🔧 {}: {}", step, invocation);
        tracing::debug!(step, command = %invocation, "step started");

        let outcome = self.runner.run(invocation).await?;
        if !outcome.success {
            return Err(ReleaseError::CommandFailed {
                step: step.to_string(),
                command: invocation.to_string(),
                code: outcome.exit_code,
            });
        }

        println!("  ✅ {} passed\n", step);
        Ok(())
    }

    /// Upload to `kind`, returning the registry name
    ///
    /// Fails before running anything when no token resolves.
    async fn publish(&self, kind: RegistryKind) -> Result<String, ReleaseError> {
        let target = self.config.registries.get(kind).clone();
        let token = self.tokens.require(&target)?;
        println!("🔑 {} token from {}", target.name, token.source);

        let invocation = publish_invocation(&self.config.commands.publish, &target)?
            .secret_env(self.config.publish_token_env.clone(), token.secret);

        self.execute(&format!("publish to {}", target.name), &invocation)
            .await?;
        tracing::debug!(registry = %target.name, kind = kind.as_str(), "published");
        Ok(target.name)
    }
}
