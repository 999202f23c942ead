//! Release artifact naming and install layout.
//!
//! Both are derived fresh for every install attempt and thrown away after.

use std::path::PathBuf;

use relbin_schema::{ArchiveFormat, Arch, Host, Os, Platform, Version};
use tempfile::NamedTempFile;

use crate::{ProvisionError, ProvisionerConfig};

/// Which file to fetch for one `(version, platform)` pair, and what to look
/// for inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifact {
    /// Platform the artifact was selected for
    pub platform: Platform,
    /// Marker-free version, used in both the tag and the file name
    pub version: Version,
    /// Archive format (`zip` on Windows, `tar.gz` elsewhere)
    pub format: ArchiveFormat,
    /// Executable file name expected inside the archive
    pub binary_name: String,
    /// Download URL
    pub url: String,
}

impl ReleaseArtifact {
    /// Describe the artifact for `version` on the platform detected from `host`.
    ///
    /// Deterministic: the same inputs always give the same URL.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::UnsupportedOs`] or
    /// [`ProvisionError::UnsupportedArch`] when the host cannot be mapped to
    /// a published platform, and [`ProvisionError::InvalidVersion`] when the
    /// version has no numeric part.
    pub fn resolve(
        config: &ProvisionerConfig,
        host: &Host,
        version: &Version,
    ) -> Result<Self, ProvisionError> {
        let platform = Platform::resolve(host);
        if platform.os == Os::Unsupported {
            return Err(ProvisionError::UnsupportedOs(host.os_family.clone()));
        }
        if platform.arch == Arch::Unsupported {
            return Err(ProvisionError::UnsupportedArch(host.machine.clone()));
        }

        let version = version.normalized()?;
        let format = platform.archive_format();
        let url = format!(
            "{base}/{repo}/releases/download/v{version}/{name}_{version}_{os}_{arch}.{ext}",
            base = config.base_url,
            repo = config.repository,
            name = config.repository.name(),
            os = platform.os,
            arch = platform.arch,
            ext = format.extension(),
        );

        Ok(Self {
            platform,
            binary_name: platform.executable_name(&config.binary_name),
            version,
            format,
            url,
        })
    }
}

/// Where an artifact's binary lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    /// Install directory
    pub dir: PathBuf,
    /// Final path of the installed binary
    pub binary: PathBuf,
}

impl InstallTarget {
    /// Layout for `artifact` under the configured install directory.
    pub fn new(config: &ProvisionerConfig, artifact: &ReleaseArtifact) -> Self {
        Self {
            binary: config.install_dir.join(&artifact.binary_name),
            dir: config.install_dir.clone(),
        }
    }

    /// Create the temporary archive file, `archive.<random>.<ext>`, next to
    /// the binary. The file is deleted when the handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be created.
    pub fn temp_archive(&self, format: ArchiveFormat) -> std::io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix("archive.")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(&self.dir)
    }
}
