//! Repository sources: download, extraction and content root detection.

use crate::error::{CertifyError, Result};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tempfile::TempDir;

/// Where a repository comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryLocation {
    /// Zip archive served over HTTP(S)
    Url(String),
    /// Zip archive on disk
    Archive(PathBuf),
    /// Already extracted checkout
    Directory(PathBuf),
}

impl RepositoryLocation {
    /// Classify a CLI argument: URL, existing directory, or archive path
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::Url(input.to_string());
        }
        let path = PathBuf::from(input);
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Archive(path)
        }
    }
}

impl FromStr for RepositoryLocation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Archive(path) | Self::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Downloads a repository archive
pub trait ArchiveFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Unpacks a repository archive into a directory
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &[u8], dest: &Path) -> Result<()>;
}

/// Blocking HTTP download with reqwest
#[cfg(feature = "fetch")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| CertifyError::fetch("", format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "fetch")]
impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::info!("Downloading repository from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| CertifyError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CertifyError::fetch(url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .map_err(|e| CertifyError::fetch(url, e.to_string()))?;
        tracing::debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Fetcher used when the crate is built without HTTP support
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

impl ArchiveFetcher for OfflineFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(CertifyError::fetch(
            url,
            "built without the `fetch` feature; pass a local archive or directory",
        ))
    }
}

/// The HTTP fetcher when available, otherwise the offline one
pub fn default_fetcher(timeout: Duration) -> Result<Box<dyn ArchiveFetcher>> {
    #[cfg(feature = "fetch")]
    {
        Ok(Box::new(HttpFetcher::new(timeout)?))
    }
    #[cfg(not(feature = "fetch"))]
    {
        let _ = timeout;
        Ok(Box::new(OfflineFetcher))
    }
}

/// Zip extraction with the zip crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive: &[u8], dest: &Path) -> Result<()> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
        tracing::debug!("Extracting {} archive entries to {}", zip.len(), dest.display());
        // Entries escaping `dest` are rejected by the zip crate
        zip.extract(dest)?;
        Ok(())
    }
}

/// Extracted repository owned for the duration of one run.
///
/// For archives the extraction directory is removed on [`close`](Self::close)
/// or drop; a local directory is used in place and never modified.
#[derive(Debug)]
pub struct RepositorySource {
    root: PathBuf,
    extraction: Option<TempDir>,
}

impl RepositorySource {
    /// Materialize `location` as a directory tree
    pub fn open(
        location: &RepositoryLocation,
        fetcher: &dyn ArchiveFetcher,
        extractor: &dyn ArchiveExtractor,
        work_parent: Option<&Path>,
    ) -> Result<Self> {
        let bytes = match location {
            RepositoryLocation::Directory(path) => {
                if !path.is_dir() {
                    return Err(CertifyError::extract(format!(
                        "Repository directory not found: {}",
                        path.display()
                    )));
                }
                return Ok(Self {
                    root: path.clone(),
                    extraction: None,
                });
            }
            RepositoryLocation::Url(url) => fetcher.fetch(url)?,
            RepositoryLocation::Archive(path) => {
                std::fs::read(path).map_err(|e| CertifyError::io(path, e))?
            }
        };

        let extraction = new_temp_dir("apicert-repo-", work_parent)?;
        extractor.extract(&bytes, extraction.path())?;
        let root = content_root(extraction.path())?;
        tracing::info!("Content root folder: {}", root.display());

        Ok(Self {
            root,
            extraction: Some(extraction),
        })
    }

    /// Root folder holding the metadata descriptor
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the extraction directory, reporting failures
    pub fn close(self) -> Result<()> {
        if let Some(dir) = self.extraction {
            let path = dir.path().to_path_buf();
            dir.close().map_err(|e| CertifyError::io(path, e))?;
        }
        Ok(())
    }
}

/// Archives often wrap everything in one top-level folder; use it as the root
pub fn content_root(extracted: &Path) -> Result<PathBuf> {
    let mut children = std::fs::read_dir(extracted)
        .map_err(|e| CertifyError::io(extracted, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| CertifyError::io(extracted, e))?;

    if children.len() == 1 {
        if let Some(only) = children.pop() {
            let path = only.path();
            if path.is_dir() {
                tracing::debug!("Using single subdirectory {} as content root", path.display());
                return Ok(path);
            }
        }
    }
    Ok(extracted.to_path_buf())
}

pub(crate) fn new_temp_dir(prefix: &str, parent: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);
    match parent {
        Some(parent) => builder
            .tempdir_in(parent)
            .map_err(|e| CertifyError::io(parent, e)),
        None => builder.tempdir().map_err(CertifyError::from),
    }
}
