//! ccswitch core - Profile store and activation engine
//!
//! This crate owns the durable list of named API-credential profiles and
//! projects the chosen one into Claude Code's settings file and the
//! environment. It has no UI; front ends drive it.

#![warn(clippy::all, clippy::pedantic)]

pub mod activate;
pub mod catalog;
pub mod paths;
pub mod profile;
pub mod projects;
pub mod storage;
pub mod util;

pub use activate::{ActivationEngine, ActivationError, EnvScope};
pub use paths::AppPaths;
pub use profile::{Profile, ProfileDraft, ProfileUpdate, ProbeResult, TestStatus};
pub use storage::{ProfileStore, StoreError};
