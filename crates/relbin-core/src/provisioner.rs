//! Binary provisioning: fetch, extract, install, uninstall.
//!
//! A failed provisioning must never fail the package operation that
//! triggered it. Every error is therefore reported as one warning line and
//! handed back as an [`InstallOutcome`] rather than an `Err`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use relbin_schema::{Host, Version, VersionError};
use thiserror::Error;

use crate::io::download::{self, DownloadError};
use crate::io::extract::{self, ExtractError};
use crate::{InstallTarget, ProvisionerConfig, ReleaseArtifact, Reporter};

/// Everything that can stop a binary from being installed.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The host OS family has no published artifact.
    #[error("Unsupported OS '{0}', skipping binary download")]
    UnsupportedOs(String),

    /// The host architecture has no published artifact.
    #[error("Unsupported architecture '{0}', skipping binary download")]
    UnsupportedArch(String),

    /// The package version cannot be mapped to a release tag.
    #[error("{0}, skipping binary download")]
    InvalidVersion(#[from] VersionError),

    /// The archive could not be fetched.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The archive could not be read or lacks the binary.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Extraction reported success but the binary is not on disk.
    #[error("Binary not found at {} after extraction", .0.display())]
    MissingAfterExtraction(PathBuf),

    /// Filesystem error preparing the install directory or setting permissions.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ProvisionError {
    /// Whether provisioning was skipped up front, before touching the
    /// network or filesystem.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOs(_) | Self::UnsupportedArch(_) | Self::InvalidVersion(_)
        )
    }
}

/// Result of one install attempt.
#[derive(Debug)]
pub enum InstallOutcome {
    /// The binary is in place.
    Installed {
        /// Installed binary path
        path: PathBuf,
        /// Size of the binary in bytes
        bytes: u64,
    },
    /// Nothing was attempted (unsupported platform, unusable version).
    Skipped(ProvisionError),
    /// Download or extraction failed; no binary was installed.
    Failed(ProvisionError),
}

impl InstallOutcome {
    /// Whether the binary was installed.
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

/// Downloads and installs release binaries for one configured repository.
#[derive(Debug)]
pub struct Provisioner<R: Reporter> {
    config: ProvisionerConfig,
    client: Client,
    host: Host,
    reporter: R,
}

impl<R: Reporter> Provisioner<R> {
    /// Create a provisioner for the running host.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ProvisionerConfig, reporter: R) -> Result<Self, DownloadError> {
        let client = download::build_client(&config)?;
        Ok(Self {
            config,
            client,
            host: Host::current(),
            reporter,
        })
    }

    /// Resolve platforms against `host` instead of the running machine.
    pub fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    /// Install the binary for `version`. Never fails; see [`InstallOutcome`].
    pub fn install(&self, version: &Version) -> InstallOutcome {
        let name = &self.config.binary_name;

        let artifact = match ReleaseArtifact::resolve(&self.config, &self.host, version) {
            Ok(artifact) => artifact,
            Err(e) => {
                self.reporter.warning(&format!("{name}: {e}"));
                return InstallOutcome::Skipped(e);
            }
        };

        self.reporter.info(&format!(
            "{name}: Downloading binary for {} (v{})...",
            artifact.platform, artifact.version
        ));
        tracing::debug!(url = %artifact.url, "resolved release artifact");

        match self.fetch_and_install(&artifact) {
            Ok((path, bytes)) => {
                self.reporter
                    .success(&format!("{name}: Binary installed successfully"));
                InstallOutcome::Installed { path, bytes }
            }
            Err(e) => {
                self.reporter
                    .warning(&format!("{name}: Failed to install binary: {e}"));
                InstallOutcome::Failed(e)
            }
        }
    }

    fn fetch_and_install(&self, artifact: &ReleaseArtifact) -> Result<(PathBuf, u64), ProvisionError> {
        let target = InstallTarget::new(&self.config, artifact);
        fs::create_dir_all(&target.dir)?;

        // Removed on drop, on every path out of this function.
        let mut archive = target.temp_archive(artifact.format)?;
        tracing::debug!(path = %archive.path().display(), "downloading archive");

        download::download_to(&self.client, &artifact.url, archive.as_file_mut())?;

        let mut reader = extract::open_reader(artifact.format, archive.reopen()?)?;
        let bytes = extract::extract_binary(reader.as_mut(), &artifact.binary_name, &target.binary)?;

        if !target.binary.is_file() {
            return Err(ProvisionError::MissingAfterExtraction(target.binary));
        }

        if !artifact.platform.os.is_windows() {
            make_executable(&target.binary)?;
        }

        Ok((target.binary, bytes))
    }

    /// Remove any installed binary and, if nothing else is left in it, the
    /// install directory. Safe to call when nothing is installed.
    pub fn uninstall(&self) {
        let name = &self.config.binary_name;
        let dir = &self.config.install_dir;

        for file in [name.clone(), format!("{name}.exe")] {
            let path = dir.join(file);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed binary"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => self.reporter.warning(&format!(
                    "{name}: Failed to remove {}: {e}",
                    path.display()
                )),
            }
        }

        match remove_dir_if_empty(dir) {
            Ok(true) => tracing::debug!(dir = %dir.display(), "removed install directory"),
            Ok(false) => {}
            Err(e) => self.reporter.warning(&format!(
                "{name}: Failed to remove {}: {e}",
                dir.display()
            )),
        }
    }
}

/// Returns `true` if `dir` existed, was empty, and was removed.
fn remove_dir_if_empty(dir: &Path) -> io::Result<bool> {
    let mut entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if entries.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(dir)?;
    Ok(true)
}

/// Archives do not reliably carry the executable bit, so it is always set.
#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
