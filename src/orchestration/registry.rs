//! Registry upload commands and the post-upload install hint

use crate::core::config::RegistryTarget;
use crate::core::error::ReleaseError;
use crate::core::traits::CommandInvocation;
use crate::validation::Version;

/// The publish command for `target`, without credentials
///
/// The registry endpoint is appended as `--publish-url <url>`. The token is
/// attached separately through the child environment.
pub fn publish_invocation(
    publish: &[String],
    target: &RegistryTarget,
) -> Result<CommandInvocation, ReleaseError> {
    let invocation = CommandInvocation::from_argv(publish).ok_or_else(|| ReleaseError::Config {
        message: "commands.publish must not be empty".to_string(),
    })?;
    Ok(invocation.args(["--publish-url", target.publish_url.as_str()]))
}

/// `pip install` line that pulls `package==version` from the staging index
///
/// Dependencies that only exist on the production index resolve through
/// `--extra-index-url`.
pub fn verify_hint(
    package: &str,
    version: Version,
    staging: &RegistryTarget,
    production: &RegistryTarget,
) -> String {
    format!(
        "pip install --index-url {} --extra-index-url {} {}=={}",
        staging.index_url, production.index_url, package, version
    )
}
