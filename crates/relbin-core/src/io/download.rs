//! Blocking release download.
//!
//! Provisioning runs inside a package manager's synchronous hook, so this is
//! a plain blocking fetch. Timeouts and redirects are the client's business.

use std::io::Write;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::ProvisionerConfig;

/// Errors raised while fetching a release archive.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure (DNS, connect, TLS, timeout, truncated body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Failed to download {url} (HTTP {status})")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Writing the body to disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the HTTP client used for release downloads.
///
/// # Errors
///
/// Returns [`DownloadError::Http`] if the TLS backend cannot be initialised.
pub fn build_client(config: &ProvisionerConfig) -> Result<Client, DownloadError> {
    let mut builder = Client::builder().user_agent(crate::USER_AGENT);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Stream `url` into `out`, returning the number of bytes written.
///
/// Nothing is written unless the response status is a success.
///
/// # Errors
///
/// Returns [`DownloadError::Status`] for a non-2xx response, otherwise any
/// transport or write error.
pub fn download_to<W: Write>(client: &Client, url: &str, out: &mut W) -> Result<u64, DownloadError> {
    let mut response = client.get(url).send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let written = response.copy_to(out)?;
    out.flush()?;

    tracing::debug!(url, bytes = written, "download complete");
    Ok(written)
}
