use crate::infrastructure::mega::RemoteFetcher;
use crate::infrastructure::telegram::{MediaKind, TelegramClient};
use crate::modules::task::events::RelayJob;
use crate::workers::scratch::ScratchDir;
use mime::Mime;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Largest file the local Bot API server accepts for upload.
pub const UPLOAD_LIMIT_BYTES: u64 = 2 * 1024 * 1024 * 1024;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

const DOWNLOAD_FAILED_TEXT: &str = "❌ Download failed.";
const DONE_TEXT: &str = "✅ Done.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Delivered,
    /// Nothing was uploaded, but the requester was told why.
    TooLarge { size_bytes: u64 },
    DownloadMissing,
    Failed { reason: String },
}

impl JobOutcome {
    pub fn ok(&self) -> bool {
        matches!(self, JobOutcome::Delivered | JobOutcome::TooLarge { .. })
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Delivered => f.write_str("delivered"),
            JobOutcome::TooLarge { size_bytes } => write!(f, "too large ({})", format_gib(*size_bytes)),
            JobOutcome::DownloadMissing => f.write_str("download missing"),
            JobOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub mime: Mime,
    pub kind: MediaKind,
}

impl DownloadResult {
    fn inspect(path: PathBuf, size_bytes: u64) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        let kind = MediaKind::for_mime(&mime);

        Self {
            path,
            file_name,
            size_bytes,
            mime,
            kind,
        }
    }
}

pub fn exceeds_upload_limit(size_bytes: u64) -> bool {
    size_bytes > UPLOAD_LIMIT_BYTES
}

/// Size in GiB with one decimal, e.g. `3.0 GB`.
pub fn format_gib(size_bytes: u64) -> String {
    format!("{:.1} GB", size_bytes as f64 / BYTES_PER_GIB)
}

/// Runs one job end to end: download, check, republish, report, clean up.
#[derive(Clone)]
pub struct RelayProcessor {
    telegram: TelegramClient,
    fetcher: Arc<dyn RemoteFetcher>,
    scratch_root: PathBuf,
}

impl RelayProcessor {
    pub fn new(telegram: TelegramClient, fetcher: Arc<dyn RemoteFetcher>, scratch_root: PathBuf) -> Self {
        Self {
            telegram,
            fetcher,
            scratch_root,
        }
    }

    pub async fn process(&self, job: &RelayJob) -> JobOutcome {
        info!(chat_id = job.chat_id, url = %job.mega_url, fetcher = self.fetcher.name(), "Processing relay job");

        let mut scratch = match ScratchDir::create(&self.scratch_root).await {
            Ok(scratch) => scratch,
            Err(e) => {
                let e = anyhow::Error::new(e).context("cannot create scratch directory");
                return self.fail(job, &e).await;
            }
        };

        let mut downloaded = None;
        let outcome = match self.run(job, scratch.path(), &mut downloaded).await {
            Ok(outcome) => outcome,
            Err(e) => self.fail(job, &e).await,
        };

        scratch.cleanup(downloaded.as_deref()).await;

        info!(chat_id = job.chat_id, %outcome, "Relay job finished");
        outcome
    }

    async fn run(
        &self,
        job: &RelayJob,
        scratch: &Path,
        downloaded: &mut Option<PathBuf>,
    ) -> anyhow::Result<JobOutcome> {
        let fetched = self.fetcher.fetch(&job.mega_url, scratch).await?;
        downloaded.clone_from(&fetched);

        let metadata = match &fetched {
            Some(path) => tokio::fs::metadata(path).await.ok().filter(|m| m.is_file()),
            None => None,
        };
        let (Some(path), Some(metadata)) = (fetched, metadata) else {
            warn!(chat_id = job.chat_id, "Download produced no file");
            self.telegram.send_message(job.chat_id, DOWNLOAD_FAILED_TEXT).await?;
            return Ok(JobOutcome::DownloadMissing);
        };

        let download = DownloadResult::inspect(path, metadata.len());
        info!(
            chat_id = job.chat_id,
            file = %download.file_name,
            size_bytes = download.size_bytes,
            mime = %download.mime,
            "Download complete"
        );

        if exceeds_upload_limit(download.size_bytes) {
            warn!(chat_id = job.chat_id, size_bytes = download.size_bytes, "File exceeds upload limit");
            let text = format!(
                "⚠️ File is {}, which exceeds the 2 GB upload limit.",
                format_gib(download.size_bytes)
            );
            self.telegram.send_message(job.chat_id, &text).await?;
            return Ok(JobOutcome::TooLarge {
                size_bytes: download.size_bytes,
            });
        }

        self.telegram
            .send_media(
                job.chat_id,
                download.kind,
                &download.path,
                &download.file_name,
                download.mime.clone(),
            )
            .await?;

        self.telegram.send_message(job.chat_id, DONE_TEXT).await?;
        Ok(JobOutcome::Delivered)
    }

    async fn fail(&self, job: &RelayJob, e: &anyhow::Error) -> JobOutcome {
        let reason = format!("{e:#}");
        error!(chat_id = job.chat_id, error = %reason, "Relay job failed");

        if let Err(notify_err) = self
            .telegram
            .send_message(job.chat_id, &format!("❌ Failed: {reason}"))
            .await
        {
            error!(chat_id = job.chat_id, error = ?notify_err, "Could not report failure to chat");
        }

        JobOutcome::Failed { reason }
    }
}
