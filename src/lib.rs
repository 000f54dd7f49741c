pub mod core;
pub mod logging;
pub mod orchestration;
pub mod security;
pub mod validation;

pub use core::*;
pub use orchestration::{ReleaseOptions, ReleasePublisher, ReleaseReport};
pub use security::{CommandError, SafeCommandExecutor, SecureTokenManager};
pub use validation::{BumpKind, Manifest, Version};
