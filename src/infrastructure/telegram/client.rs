use mime::Mime;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Default timeout for every Bot API call.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(600);
/// Per-request timeout for file uploads.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(1800);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("{method} request failed")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned {status}: {body}")]
    Status {
        method: String,
        status: StatusCode,
        body: String,
    },
    #[error("cannot attach {}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Upload flavour for a republished file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Document,
}

impl MediaKind {
    pub fn for_mime(mime: &Mime) -> Self {
        if mime.type_() == mime::VIDEO {
            MediaKind::Video
        } else {
            MediaKind::Document
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            MediaKind::Video => "sendVideo",
            MediaKind::Document => "sendDocument",
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

/// A file streamed from disk as one multipart part.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub field: &'static str,
    pub path: PathBuf,
    pub file_name: String,
    pub mime: Mime,
}

/// Thin Bot API client. Every call is a single POST to
/// `{base}/bot{token}/{method}`; non-2xx answers become errors.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(TelegramError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    pub async fn send(
        &self,
        method: &str,
        chat_id: i64,
        fields: Vec<(&'static str, String)>,
        file: Option<FileAttachment>,
    ) -> Result<Value, TelegramError> {
        let mut params = vec![("chat_id", chat_id.to_string())];
        params.extend(fields);

        let request = self.http.post(self.method_url(method));
        let request = match file {
            None => request.form(&params),
            Some(file) => {
                let part = Self::file_part(&file).await?;
                let form = params
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value))
                    .part(file.field, part);
                request.multipart(form).timeout(UPLOAD_TIMEOUT)
            }
        };

        debug!(method, chat_id, "Calling Bot API");

        // without_url() keeps the bot token out of error messages shown in chat
        let transport = |source: reqwest::Error| TelegramError::Transport {
            method: method.to_string(),
            source: source.without_url(),
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Status {
                method: method.to_string(),
                status,
                body,
            });
        }

        response.json::<Value>().await.map_err(transport)
    }

    async fn file_part(file: &FileAttachment) -> Result<Part, TelegramError> {
        let attachment_error = |source| TelegramError::Attachment {
            path: file.path.clone(),
            source,
        };

        let handle = tokio::fs::File::open(&file.path)
            .await
            .map_err(attachment_error)?;
        let len = handle.metadata().await.map_err(attachment_error)?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(handle));

        Part::stream_with_length(body, len)
            .file_name(file.file_name.clone())
            .mime_str(file.mime.as_ref())
            .map_err(|source| TelegramError::Transport {
                method: "multipart".to_string(),
                source,
            })
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Value, TelegramError> {
        self.send("sendMessage", chat_id, vec![("text", text.to_string())], None)
            .await
    }

    /// Upload `path` with its file name as caption.
    pub async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        path: &Path,
        file_name: &str,
        mime: Mime,
    ) -> Result<Value, TelegramError> {
        let attachment = FileAttachment {
            field: kind.field(),
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            mime,
        };

        self.send(
            kind.method(),
            chat_id,
            vec![("caption", file_name.to_string())],
            Some(attachment),
        )
        .await
    }
}
