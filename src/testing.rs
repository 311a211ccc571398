//! Test doubles and helpers shared by the unit tests.

use crate::config::settings::AppConfig;
use crate::infrastructure::mega::{FetchError, RemoteFetcher};
use crate::state::AppState;
use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[derive(Debug, Clone)]
pub enum FakeDownload {
    /// Leave a (sparse) file of `size` bytes named `name`.
    File { name: &'static str, size: u64 },
    /// Like `File`, but only once `gate` is notified.
    Gated {
        gate: Arc<Notify>,
        name: &'static str,
        size: u64,
    },
    /// Finish without writing anything.
    Nothing,
    /// Report a path that does not exist.
    Vanished,
    Error(&'static str),
}

pub struct FakeFetcher {
    behaviour: FakeDownload,
    last_dest: Mutex<Option<PathBuf>>,
}

impl FakeFetcher {
    pub fn new(behaviour: FakeDownload) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            last_dest: Mutex::new(None),
        })
    }

    pub fn last_dest(&self) -> Option<PathBuf> {
        self.last_dest.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteFetcher for FakeFetcher {
    async fn fetch(&self, _url: &str, dest: &Path) -> Result<Option<PathBuf>, FetchError> {
        *self.last_dest.lock().unwrap() = Some(dest.to_path_buf());

        match &self.behaviour {
            FakeDownload::File { name, size } => write_file(dest, name, *size),
            FakeDownload::Gated { gate, name, size } => {
                gate.notified().await;
                write_file(dest, name, *size)
            }
            FakeDownload::Nothing => Ok(None),
            FakeDownload::Vanished => Ok(Some(dest.join("ghost.bin"))),
            FakeDownload::Error(stderr) => Err(FetchError::Exit {
                code: "1".to_string(),
                stderr: stderr.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn write_file(dest: &Path, name: &str, size: u64) -> Result<Option<PathBuf>, FetchError> {
    let path = dest.join(name);
    let io_error = |source| FetchError::Io {
        dir: dest.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(&path).map_err(io_error)?;
    file.set_len(size).map_err(io_error)?;
    Ok(Some(path))
}

/// Bot API stub answering `{"ok": true}` to every POST.
pub async fn mock_telegram() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
        .mount(&server)
        .await;
    server
}

fn method_name(request: &Request) -> String {
    request
        .url
        .path()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

async fn requests(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

/// Bot API methods called, in order.
pub async fn bot_calls(server: &MockServer) -> Vec<String> {
    requests(server).await.iter().map(method_name).collect()
}

/// `text` field of every `sendMessage` call, in order.
pub async fn sent_texts(server: &MockServer) -> Vec<String> {
    requests(server)
        .await
        .iter()
        .filter(|r| method_name(r) == "sendMessage")
        .filter_map(|r| {
            url::form_urlencoded::parse(&r.body)
                .find(|(key, _)| key == "text")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}

/// Raw multipart bodies of calls to `bot_method`.
pub async fn multipart_bodies(server: &MockServer, bot_method: &str) -> Vec<String> {
    requests(server)
        .await
        .iter()
        .filter(|r| method_name(r) == bot_method)
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

pub fn test_state(server: &MockServer, scratch_root: &Path, fetcher: Arc<dyn RemoteFetcher>) -> AppState {
    let config = AppConfig::for_tests(&server.uri(), scratch_root.to_path_buf());
    AppState::with_fetcher(config, fetcher).unwrap()
}
