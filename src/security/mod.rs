pub mod command_executor;
pub mod pypirc;
pub mod token_manager;

pub use command_executor::{ALLOWED_COMMANDS, CommandError, SafeCommandExecutor};
pub use token_manager::{ResolvedToken, SecureTokenManager, TokenSource};
