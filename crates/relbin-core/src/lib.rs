//! Core library for relbin.
//!
//! Turns a package version into a runnable local binary: resolve the host
//! platform, download the matching release archive, pull the executable out
//! of it and install it. Failures never escape [`Provisioner::install`];
//! they are reported through a [`Reporter`] and returned as an
//! [`InstallOutcome`].

pub mod config;
pub mod io;
pub mod lifecycle;
pub mod paths;
pub mod provisioner;
pub mod release;
pub mod reporter;

pub use config::{ConfigError, ProvisionerConfig};
pub use lifecycle::{
    Dispatcher, HookMessage, InstallHandler, LifecycleEvent, OperationKind, PackageRef,
};
pub use provisioner::{InstallOutcome, ProvisionError, Provisioner};
pub use release::{InstallTarget, ReleaseArtifact};
pub use reporter::{NullReporter, Reporter, TracingReporter};

/// User Agent string for release downloads
pub const USER_AGENT: &str = concat!("relbin/", env!("CARGO_PKG_VERSION"));
