//! Shared types for relbin.
//!
//! Everything in this crate is pure: no network, no filesystem. The core
//! crate builds its provisioning pipeline on top of these.

pub mod platform;
pub mod repo;
pub mod types;

// Re-exports
pub use platform::*;
pub use repo::GitHubRepo;
pub use types::*;
