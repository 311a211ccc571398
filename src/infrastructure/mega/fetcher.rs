//! Downloads public MEGA links into a local directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Prefix megatools uses for in-flight partial downloads.
const PARTIAL_PREFIX: &str = ".megatmp";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run {}", binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("megadl exited with {code}: {stderr}")]
    Exit { code: String, stderr: String },
    #[error("cannot inspect {}", dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Download `url` into `dest`.
    ///
    /// `Ok(None)` means the transfer finished without leaving a file behind.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<Option<PathBuf>, FetchError>;

    fn name(&self) -> &'static str;
}

/// Fetcher backed by the `megadl` binary from megatools.
///
/// `megadl` opens an anonymous session for public links, so no
/// account credentials are involved.
pub struct MegadlFetcher {
    binary_path: PathBuf,
}

impl MegadlFetcher {
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }
}

#[async_trait]
impl RemoteFetcher for MegadlFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<Option<PathBuf>, FetchError> {
        info!(dest = %dest.display(), "Starting megadl");

        let output = Command::new(&self.binary_path)
            .arg("--no-progress")
            .arg("--path")
            .arg(dest)
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| FetchError::Spawn {
                binary: self.binary_path.clone(),
                source,
            })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(FetchError::Exit {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "megadl finished");
        find_downloaded_file(dest).await
    }

    fn name(&self) -> &'static str {
        "megadl"
    }
}

/// First regular file in `dir` by name, skipping partial downloads.
async fn find_downloaded_file(dir: &Path) -> Result<Option<PathBuf>, FetchError> {
    let io_error = |source| FetchError::Io {
        dir: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let is_partial = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(PARTIAL_PREFIX));
        if is_partial {
            continue;
        }
        if entry.file_type().await.map_err(io_error)?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files.into_iter().next())
}
