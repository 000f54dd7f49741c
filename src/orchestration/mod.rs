//! Orchestration layer for release runs
//!
//! Sequences the release pipeline on top of the core, security and
//! validation modules.

pub mod registry;
pub mod release_publisher;

pub use release_publisher::{ReleaseOptions, ReleasePublisher, ReleaseReport, VersionRequest};
