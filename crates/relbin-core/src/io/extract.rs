//! Archive extraction module
//!
//! Release archives are expected to carry a single executable, but its
//! location inside the archive has moved between releases (top level,
//! `bin/`, a versioned directory). Lookups therefore match on the entry's
//! base filename only, and the first match wins. This tolerance is part of
//! the contract.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use relbin_schema::ArchiveFormat;
use thiserror::Error;
use zip::ZipArchive;

/// Errors raised while pulling a binary out of an archive.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Filesystem error outside the archive stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The archive is corrupt or not in the expected format.
    #[error("Archive error: {0}")]
    Archive(String),

    /// The archive opened fine but holds no entry with the requested name.
    #[error("Binary \"{name}\" not found in {format} archive")]
    NotFound {
        /// Base filename that was searched for
        name: String,
        /// Format of the archive searched
        format: ArchiveFormat,
    },
}

/// Read access to one archive, keyed by entry base filename.
pub trait ArchiveReader {
    /// Format of the underlying archive.
    fn format(&self) -> ArchiveFormat;

    /// Contents of the first regular-file entry whose base filename equals
    /// `name`, ignoring any directories in the entry path.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::NotFound`] when no entry matches and
    /// [`ExtractError::Archive`] when the archive cannot be read.
    fn find_entry_by_basename(&mut self, name: &str) -> Result<Vec<u8>, ExtractError>;
}

/// Last path component of an archive entry name. Accepts both separators,
/// since zips built on Windows sometimes use `\`.
fn basename(entry_name: &str) -> &str {
    entry_name
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry_name)
}

/// Zip archive reader.
#[derive(Debug)]
pub struct ZipReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ZipReader<R> {
    /// Open a zip archive from a seekable reader.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Archive`] if the central directory cannot be read.
    pub fn new(reader: R) -> Result<Self, ExtractError> {
        let archive = ZipArchive::new(reader).map_err(|e| ExtractError::Archive(e.to_string()))?;
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> ArchiveReader for ZipReader<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn find_entry_by_basename(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        for i in 0..self.archive.len() {
            let mut file = self
                .archive
                .by_index(i)
                .map_err(|e| ExtractError::Archive(e.to_string()))?;

            if file.is_dir() || basename(file.name()) != name {
                continue;
            }

            // Declared sizes are untrusted; let the buffer grow as data arrives.
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .map_err(|e| ExtractError::Archive(e.to_string()))?;
            return Ok(content);
        }

        Err(ExtractError::NotFound {
            name: name.to_string(),
            format: ArchiveFormat::Zip,
        })
    }
}

/// Gzip-compressed tar reader.
///
/// Tar is a sequential format, so a reader supports a single lookup.
pub struct TarGzReader<R: Read> {
    archive: tar::Archive<GzDecoder<R>>,
}

impl<R: Read> std::fmt::Debug for TarGzReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TarGzReader").finish_non_exhaustive()
    }
}

impl<R: Read> TarGzReader<R> {
    /// Wrap a reader positioned at the start of a `.tar.gz` stream.
    pub fn new(reader: R) -> Self {
        Self {
            archive: tar::Archive::new(GzDecoder::new(reader)),
        }
    }
}

impl<R: Read> ArchiveReader for TarGzReader<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }

    fn find_entry_by_basename(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        // Gzip and tar framing errors both surface as io::Error from the
        // entry iterator; they mean the stream is unreadable.
        let entries = self
            .archive
            .entries()
            .map_err(|e| ExtractError::Archive(e.to_string()))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| ExtractError::Archive(e.to_string()))?;

            if !entry.header().entry_type().is_file() {
                continue;
            }
            let entry_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            if basename(&entry_name) != name {
                continue;
            }

            let declared = entry.size();
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| ExtractError::Archive(e.to_string()))?;
            if content.len() as u64 != declared {
                return Err(ExtractError::Archive(format!(
                    "entry {entry_name} is truncated: header declares {declared} bytes, stream holds {}",
                    content.len()
                )));
            }
            return Ok(content);
        }

        Err(ExtractError::NotFound {
            name: name.to_string(),
            format: ArchiveFormat::TarGz,
        })
    }
}

/// Open `file` with the reader matching `format`.
///
/// # Errors
///
/// Returns [`ExtractError::Archive`] if a zip's central directory is unreadable.
/// Tar streams are only validated on lookup.
pub fn open_reader(format: ArchiveFormat, file: File) -> Result<Box<dyn ArchiveReader>, ExtractError> {
    Ok(match format {
        ArchiveFormat::Zip => Box::new(ZipReader::new(BufReader::new(file))?),
        ArchiveFormat::TarGz => Box::new(TarGzReader::new(BufReader::new(file))),
    })
}

/// Write the entry named `binary_name` to `dest`, returning its size.
///
/// The entry is staged in a temporary file next to `dest` and renamed over
/// it, so an existing binary is only replaced by a complete new one. A
/// failed lookup or write leaves `dest` as it was.
///
/// # Errors
///
/// Propagates lookup errors from the reader and IO errors writing `dest`.
pub fn extract_binary(
    reader: &mut dyn ArchiveReader,
    binary_name: &str,
    dest: &Path,
) -> Result<u64, ExtractError> {
    let content = reader.find_entry_by_basename(binary_name)?;

    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".relbin-staged.")
        .tempfile_in(dir)?;
    staged.write_all(&content)?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| e.error)?;

    tracing::debug!(
        format = %reader.format(),
        entry = binary_name,
        dest = %dest.display(),
        bytes = content.len(),
        "extracted binary"
    );
    Ok(content.len() as u64)
}
