pub mod manifest;
pub mod version_validator;

pub use manifest::Manifest;
pub use version_validator::{BumpKind, Version, bump_version_str};
