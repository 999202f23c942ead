//! Host platform detection.
//!
//! Release artifacts are published per `(os, arch)` pair. Detection never
//! fails: a dimension that cannot be classified becomes `Unsupported` and
//! the caller decides what to do about it.
//!
//! # Example
//!
//! ```
//! use relbin_schema::{Arch, Host, Os, Platform};
//!
//! let platform = Platform::resolve(&Host::new("Linux", "x86_64"));
//! assert_eq!(platform.os, Os::Linux);
//! assert_eq!(platform.arch, Arch::Amd64);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::ArchiveFormat;

/// Operating system family of a release artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux
    Linux,
    /// macOS
    Darwin,
    /// Windows
    Windows,
    /// Anything else; no artifact is published for it.
    Unsupported,
}

impl Os {
    /// Classify an OS family name.
    ///
    /// Accepts the family names `Linux`, `Darwin` and `Windows`, and the
    /// lowercase names used by `std::env::consts::OS`.
    pub fn from_family(family: &str) -> Self {
        match family {
            "Linux" | "linux" => Self::Linux,
            "Darwin" | "darwin" | "macos" => Self::Darwin,
            "Windows" | "windows" => Self::Windows,
            _ => Self::Unsupported,
        }
    }

    /// Identifier used in release artifact names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Unsupported => "unsupported",
        }
    }

    /// Whether this is the Windows family.
    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CPU architecture of a release artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit x86 (`x86_64` / `amd64`)
    Amd64,
    /// 64-bit ARM (`aarch64` / `arm64`)
    Arm64,
    /// Anything else; no artifact is published for it.
    Unsupported,
}

impl Arch {
    /// Classify a machine architecture string as reported by `uname -m`.
    pub fn from_machine(machine: &str) -> Self {
        match machine {
            "x86_64" | "amd64" => Self::Amd64,
            "aarch64" | "arm64" => Self::Arm64,
            _ => Self::Unsupported,
        }
    }

    /// Identifier used in release artifact names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw host facts, as read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// OS family name (e.g. `Linux`, `Darwin`, `Windows`)
    pub os_family: String,
    /// Machine architecture string (e.g. `x86_64`, `aarch64`)
    pub machine: String,
}

impl Host {
    /// Describe an arbitrary host.
    pub fn new(os_family: impl Into<String>, machine: impl Into<String>) -> Self {
        Self {
            os_family: os_family.into(),
            machine: machine.into(),
        }
    }

    /// The host this process is running on.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }
}

/// A normalized `(os, arch)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system family
    pub os: Os,
    /// CPU architecture
    pub arch: Arch,
}

impl Platform {
    /// Classify a host. Never fails; see [`Platform::is_supported`].
    pub fn resolve(host: &Host) -> Self {
        Self {
            os: Os::from_family(&host.os_family),
            arch: Arch::from_machine(&host.machine),
        }
    }

    /// Classify the running host.
    pub fn current() -> Self {
        Self::resolve(&Host::current())
    }

    /// Whether both dimensions are known.
    pub fn is_supported(&self) -> bool {
        self.os != Os::Unsupported && self.arch != Arch::Unsupported
    }

    /// Archive format releases use on this platform.
    pub fn archive_format(&self) -> ArchiveFormat {
        if self.os.is_windows() {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }

    /// File name of an executable called `name` on this platform.
    pub fn executable_name(&self, name: &str) -> String {
        if self.os.is_windows() {
            format!("{name}.exe")
        } else {
            name.to_string()
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
