//! Release Publisher CLI
//!
//! Bump, check, build and upload a Python package

use anyhow::Result;
use clap::Parser;
use release_publisher::logging::{self, LogLevel};
use release_publisher::{
    BumpKind, ConfigLoadOptions, ConfigLoader, ReleaseError, ReleaseOptions, ReleasePublisher,
    SafeCommandExecutor, SecureTokenManager, StdinInput,
};
use std::path::PathBuf;
use std::process;
use tracing::Instrument;

/// Bump, check, build and upload a Python package to TestPyPI and PyPI
#[derive(Parser)]
#[command(name = "release-publisher")]
#[command(version)]
#[command(about = "Bump, check, build and upload a Python package", long_about = None)]
struct Cli {
    /// Bump the current version
    #[arg(long, value_enum, value_name = "KIND")]
    bump: Option<BumpKind>,

    /// Release this exact version (X.Y.Z)
    #[arg(long, value_name = "X.Y.Z")]
    set_version: Option<String>,

    /// Do not upload to TestPyPI
    #[arg(long)]
    skip_testpypi: bool,

    /// Do not print the TestPyPI install command
    #[arg(long)]
    skip_verify: bool,

    /// Upload to PyPI without asking
    #[arg(long)]
    publish_pypi: bool,

    /// Project directory holding pyproject.toml
    #[arg(long, value_name = "PATH", default_value = ".")]
    project_dir: PathBuf,

    /// Config file (defaults to <project>/.release-config.yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Diagnostic log level (overridden by RELEASE_LOG)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level) {
        eprintln!("⚠️  {}", e);
    }

    let span = tracing::info_span!("release", run_id = %logging::run_id());
    let result = run(cli).instrument(span).await;

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("\n❌ Release failed");
            eprintln!("{}", e);
            if let Some(release_error) = e.downcast_ref::<ReleaseError>() {
                eprintln!(
                    "\n{} error [{}]",
                    release_error.category(),
                    release_error.code()
                );
                eprintln!("\nSuggested actions:");
                for action in release_error.suggested_actions() {
                    eprintln!("  - {}", action);
                }
            }
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    println!("\n📦 release-publisher\n");

    let options = ReleaseOptions {
        bump: cli.bump,
        set_version: cli.set_version,
        skip_staging: cli.skip_testpypi,
        skip_verify: cli.skip_verify,
        publish_production: cli.publish_pypi,
    };
    // Flag errors win over config or filesystem problems
    options.version_request()?;

    let load_options = ConfigLoadOptions::from_process(&cli.project_dir, cli.config);
    let env = load_options.env.clone();
    let config = ConfigLoader::load(load_options).await?;

    let runner = SafeCommandExecutor::new(&cli.project_dir).map_err(ReleaseError::from)?;
    let tokens = SecureTokenManager::from_config(&config, env);
    let mut publisher =
        ReleasePublisher::new(&cli.project_dir, config, runner, StdinInput::new(), tokens);

    let report = publisher.release(options).await?;
    tracing::info!(
        version = %report.version,
        published = ?report.published,
        duration_ms = report.duration,
        "release finished"
    );

    if report.production_skipped {
        println!("\n✅ Release completed (PyPI upload skipped)");
    } else {
        println!("\n✅ Release completed successfully!");
    }
    Ok(())
}
