pub mod config;
pub mod config_loader;
pub mod error;
pub mod input;
pub mod state_machine;
pub mod traits;

pub use config::{RegistryKind, RegistryTarget, ReleaseConfig};
pub use config_loader::{ConfigLoadOptions, ConfigLoader};
pub use error::*;
pub use input::StdinInput;
pub use state_machine::{ReleaseState, ReleaseStateMachine};
pub use traits::*;
