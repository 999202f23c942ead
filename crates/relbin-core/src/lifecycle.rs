//! Lifecycle event routing.
//!
//! The package manager notifies us after it installs or updates a package.
//! Only events about the configured package trigger provisioning; the rest
//! are ignored. There is no business logic here.

use relbin_schema::{PackageName, Version};
use serde::{Deserialize, Serialize};

use crate::{InstallOutcome, Provisioner, Reporter};

/// Which package operation just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// A package was installed for the first time.
    Install,
    /// A package was moved to a different version.
    Update,
}

/// Identity and version of a package as the package manager reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Package name (`vendor/package`)
    pub name: PackageName,
    /// Pretty version (e.g. `v1.2.3`)
    pub version: Version,
}

/// A completed package operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// What happened
    pub operation: OperationKind,
    /// The package it happened to (for updates, the post-update package)
    pub package: PackageRef,
}

/// One message on the hook wire protocol.
///
/// Messages are JSON objects tagged by `hook`:
///
/// ```json
/// {"hook":"post-package-install","package":{"name":"acme/tool","version":"v1.2.3"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "kebab-case")]
pub enum HookMessage {
    /// A package was installed.
    PostPackageInstall {
        /// The installed package
        package: PackageRef,
    },
    /// A package was updated.
    PostPackageUpdate {
        /// Version before the update, if known
        #[serde(default)]
        initial: Option<PackageRef>,
        /// Version after the update
        target: PackageRef,
    },
    /// The plugin itself is being removed.
    PluginUninstall,
}

impl HookMessage {
    /// The lifecycle event this message carries, if any.
    pub fn into_event(self) -> Option<LifecycleEvent> {
        match self {
            Self::PostPackageInstall { package } => Some(LifecycleEvent {
                operation: OperationKind::Install,
                package,
            }),
            Self::PostPackageUpdate { target, .. } => Some(LifecycleEvent {
                operation: OperationKind::Update,
                package: target,
            }),
            Self::PluginUninstall => None,
        }
    }
}

/// Something that can install a binary for a version.
pub trait InstallHandler {
    /// Provision the binary for `version`.
    fn provision(&self, version: &Version) -> InstallOutcome;
}

impl<R: Reporter> InstallHandler for Provisioner<R> {
    fn provision(&self, version: &Version) -> InstallOutcome {
        self.install(version)
    }
}

/// Routes lifecycle events about one package to an [`InstallHandler`].
#[derive(Debug)]
pub struct Dispatcher<H> {
    target: PackageName,
    handler: H,
}

impl<H: InstallHandler> Dispatcher<H> {
    /// Dispatch events about `target` to `handler`.
    pub fn new(target: PackageName, handler: H) -> Self {
        Self { target, handler }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Invoke the handler if `event` concerns the target package. Installs
    /// and updates are handled alike.
    ///
    /// Returns `None` when the event was ignored.
    pub fn dispatch(&self, event: &LifecycleEvent) -> Option<InstallOutcome> {
        if event.package.name != self.target {
            tracing::trace!(package = %event.package.name, "ignoring lifecycle event");
            return None;
        }
        tracing::debug!(
            operation = ?event.operation,
            version = %event.package.version,
            "provisioning binary"
        );
        Some(self.handler.provision(&event.package.version))
    }
}
