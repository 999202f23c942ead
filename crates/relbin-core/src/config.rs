//! Provisioner configuration.
//!
//! The upstream repository and install location are injected rather than
//! compiled in, so tests can point the provisioner at a mock server.
//! A config file is optional; every key has a default.
//!
//! ```toml
//! base_url = "https://github.com"
//! repository = "alexdempster44/phpunit-parallel"
//! install_dir = "/opt/tools/.binary"
//! timeout_secs = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use relbin_schema::repo::RepoFormatError;
use relbin_schema::{GitHubRepo, PackageName};
use serde::Deserialize;
use thiserror::Error;

/// Release host used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://github.com";

/// Repository whose releases are provisioned when none is configured.
pub const DEFAULT_REPOSITORY: &str = "alexdempster44/phpunit-parallel";

/// Errors raised while loading a [`ProvisionerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config {path}: {source}", path = .path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Malformed TOML or an unknown key.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `repository` is not `owner/repo`.
    #[error(transparent)]
    Repository(#[from] RepoFormatError),

    /// Neither `RELBIN_HOME` nor a user home directory is available.
    #[error("Could not determine home directory. Set RELBIN_HOME to override.")]
    NoHome,
}

/// On-disk shape of `relbin.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    repository: Option<String>,
    package_name: Option<String>,
    binary_name: Option<String>,
    install_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

/// Everything the provisioner needs to know about what to fetch and where
/// to put it.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    /// Release host, without trailing slash (e.g. `https://github.com`)
    pub base_url: String,
    /// Upstream `owner/repo`
    pub repository: GitHubRepo,
    /// Package identity lifecycle events are matched against
    pub package_name: PackageName,
    /// Executable name inside the archive, without `.exe`
    pub binary_name: String,
    /// Directory the binary is installed into
    pub install_dir: PathBuf,
    /// Whole-request timeout handed to the HTTP client; `None` keeps the client default
    pub timeout: Option<Duration>,
}

impl ProvisionerConfig {
    /// Config for `repository`, with the package and binary named after it.
    pub fn new(repository: GitHubRepo, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            package_name: PackageName::new(repository.as_str()),
            binary_name: repository.name().to_string(),
            repository,
            install_dir: install_dir.into(),
            timeout: None,
        }
    }

    /// Point downloads at a different release host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Load from `RELBIN_CONFIG` if set, else from `<home>/relbin.toml`.
    ///
    /// Only the default location is optional: a missing file there means
    /// defaults, while a missing `RELBIN_CONFIG` file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] if no home directory can be found,
    /// or any error from [`ProvisionerConfig::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        let default_dir = crate::paths::default_install_dir().ok_or(ConfigError::NoHome)?;
        Self::load_resolved(
            crate::paths::config_override().as_deref(),
            crate::paths::default_config_path().as_deref(),
            default_dir,
        )
    }

    fn load_resolved(
        explicit: Option<&Path>,
        default_path: Option<&Path>,
        default_install_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        match (explicit, default_path) {
            (Some(path), _) => Self::load_from(path, default_install_dir),
            (None, Some(path)) if path.exists() => Self::load_from(path, default_install_dir),
            (None, _) => Self::from_toml_str("", default_install_dir),
        }
    }

    /// Load from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or a parse
    /// or validation error for its contents.
    pub fn load_from(path: &Path, default_install_dir: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded relbin config");
        Self::from_toml_str(&content, default_install_dir)
    }

    /// Parse TOML, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Repository`] if `repository` is not `owner/repo`.
    pub fn from_toml_str(content: &str, default_install_dir: PathBuf) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;

        let repository =
            GitHubRepo::new(file.repository.as_deref().unwrap_or(DEFAULT_REPOSITORY))?;
        let mut config = Self::new(repository, file.install_dir.unwrap_or(default_install_dir))
            .with_base_url(file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()));

        if let Some(name) = file.package_name {
            config.package_name = PackageName::new(&name);
        }
        if let Some(binary) = file.binary_name {
            config.binary_name = binary;
        }
        config.timeout = file.timeout_secs.map(Duration::from_secs);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProvisionerConfig::from_toml_str("", PathBuf::from("/tmp/bin")).unwrap();
        assert_eq!(config.base_url, "https://github.com");
        assert_eq!(config.repository.as_str(), DEFAULT_REPOSITORY);
        assert_eq!(config.package_name, "alexdempster44/phpunit-parallel");
        assert_eq!(config.binary_name, "phpunit-parallel");
        assert_eq!(config.install_dir, PathBuf::from("/tmp/bin"));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let toml = r#"
            base_url = "http://127.0.0.1:9000/"
            repository = "acme/tool"
            binary_name = "tool-cli"
            install_dir = "/opt/tool"
            timeout_secs = 30
        "#;
        let config = ProvisionerConfig::from_toml_str(toml, PathBuf::from("/unused")).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.package_name, "acme/tool");
        assert_eq!(config.binary_name, "tool-cli");
        assert_eq!(config.install_dir, PathBuf::from("/opt/tool"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_bad_repository() {
        let err = ProvisionerConfig::from_toml_str("repository = \"tool\"", PathBuf::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Repository(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = ProvisionerConfig::from_toml_str("repo = \"acme/tool\"", PathBuf::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProvisionerConfig::load_resolved(
            None,
            Some(&dir.path().join("relbin.toml")),
            PathBuf::from("/tmp/bin"),
        )
        .unwrap();
        assert_eq!(config.repository.as_str(), DEFAULT_REPOSITORY);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("relbin.toml");
        std::fs::write(&fallback, "repository = \"acme/tool\"\n").unwrap();

        let err = ProvisionerConfig::load_resolved(
            Some(&dir.path().join("missing.toml")),
            Some(&fallback),
            PathBuf::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { ref path, .. } if path.ends_with("missing.toml")));
    }

    #[test]
    fn test_explicit_file_wins_over_default() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        let fallback = dir.path().join("relbin.toml");
        std::fs::write(&explicit, "repository = \"acme/tool\"\n").unwrap();
        std::fs::write(&fallback, "repository = \"other/thing\"\n").unwrap();

        let config =
            ProvisionerConfig::load_resolved(Some(&explicit), Some(&fallback), PathBuf::new())
                .unwrap();
        assert_eq!(config.repository.as_str(), "acme/tool");
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProvisionerConfig::load_from(&dir.path().join("nope.toml"), PathBuf::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
