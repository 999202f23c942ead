//! Upstream repository identity.

use serde::{Deserialize, Serialize};

/// Error returned when a repository string is not `owner/repo`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid GitHub repo format: expected 'owner/repo', got '{0}'")]
pub struct RepoFormatError(pub String);

/// A validated GitHub repository reference in `owner/repo` format.
///
/// # Example
///
/// ```
/// use relbin_schema::GitHubRepo;
///
/// let repo = GitHubRepo::new("alexdempster44/phpunit-parallel").unwrap();
/// assert_eq!(repo.owner(), "alexdempster44");
/// assert_eq!(repo.name(), "phpunit-parallel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GitHubRepo(String);

impl GitHubRepo {
    /// Create a new `GitHubRepo`, validating the `owner/repo` format.
    ///
    /// # Errors
    ///
    /// Returns [`RepoFormatError`] if `s` is not in `owner/repo` format or if
    /// either component is empty.
    pub fn new(s: &str) -> Result<Self, RepoFormatError> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self(s.to_string()))
            }
            _ => Err(RepoFormatError(s.to_string())),
        }
    }

    /// Get the owner part.
    pub fn owner(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    /// Get the repo name part.
    pub fn name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or("")
    }

    /// Return the raw `owner/repo` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for GitHubRepo {
    type Error = RepoFormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<GitHubRepo> for String {
    fn from(repo: GitHubRepo) -> Self {
        repo.0
    }
}
