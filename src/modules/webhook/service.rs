use super::dto::TelegramUpdate;
use crate::infrastructure::telegram::TelegramError;
use crate::modules::task::events::RelayJob;
use crate::state::AppState;
use lazy_regex::lazy_regex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

static RE_MEGA_URL: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)https?://mega\.nz/\S+");

pub const ACK_TEXT: &str = "⏬ Got it, downloading…";

/// First MEGA link in `text`, up to the next whitespace.
pub fn find_mega_url(text: &str) -> Option<&str> {
    RE_MEGA_URL.find(text).map(|m| m.as_str())
}

pub struct Dispatched {
    pub job: RelayJob,
    pub handle: JoinHandle<()>,
}

pub struct WebhookService;

impl WebhookService {
    /// Acknowledge and hand off a relay job if the update carries a MEGA link.
    ///
    /// A failed acknowledgement is returned to the caller and nothing is dispatched.
    pub async fn handle(
        state: &AppState,
        update: TelegramUpdate,
    ) -> Result<Option<Dispatched>, TelegramError> {
        let Some(event) = update.into_event() else {
            debug!("Update without message");
            return Ok(None);
        };

        let Some(url) = find_mega_url(&event.text) else {
            debug!(chat_id = event.chat_id, "No MEGA link in message");
            return Ok(None);
        };

        let job = RelayJob {
            chat_id: event.chat_id,
            mega_url: url.to_string(),
        };
        info!(chat_id = job.chat_id, url = %job.mega_url, "MEGA link received");

        state.telegram.send_message(job.chat_id, ACK_TEXT).await?;
        let handle = state.dispatcher.dispatch(job.clone());

        Ok(Some(Dispatched { job, handle }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::webhook::dto::{Chat, IncomingMessage};
    use crate::testing::{FakeDownload, FakeFetcher, bot_calls, mock_telegram, sent_texts, test_state};
    use std::sync::Arc;
    use tokio::sync::Notify;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn update(text: Option<&str>) -> TelegramUpdate {
        TelegramUpdate {
            message: Some(IncomingMessage {
                chat: Chat { id: 42 },
                text: text.map(str::to_string),
            }),
            edited_message: None,
        }
    }

    #[test]
    fn url_is_extracted_up_to_whitespace() {
        assert_eq!(
            find_mega_url("check this out https://mega.nz/file/abc123#key more text"),
            Some("https://mega.nz/file/abc123#key")
        );
    }

    #[test]
    fn url_match_is_case_insensitive_and_keeps_query() {
        assert_eq!(
            find_mega_url("HTTP://MEGA.NZ/folder/x?y=1&z=2\tbye"),
            Some("HTTP://MEGA.NZ/folder/x?y=1&z=2")
        );
    }

    #[test]
    fn first_of_several_urls_wins() {
        assert_eq!(
            find_mega_url("https://mega.nz/file/one https://mega.nz/file/two"),
            Some("https://mega.nz/file/one")
        );
    }

    #[test]
    fn non_matching_text_yields_none() {
        for text in [
            "",
            "no links here",
            "https://example.com/file/abc",
            "https://mega.nz/",
            "https://megaXnz/file/abc",
            "mega.nz/file/abc",
        ] {
            assert_eq!(find_mega_url(text), None, "{text}");
        }
    }

    #[test]
    fn edited_message_is_used_when_message_is_absent() {
        let update = TelegramUpdate {
            message: None,
            edited_message: Some(IncomingMessage {
                chat: Chat { id: 9 },
                text: Some("  hi  ".to_string()),
            }),
        };

        let event = update.into_event().unwrap();
        assert_eq!(event.chat_id, 9);
        assert_eq!(event.text, "hi");
    }

    #[test]
    fn empty_update_has_no_event() {
        assert_eq!(TelegramUpdate::default().into_event(), None);
    }

    #[tokio::test]
    async fn text_without_link_is_a_silent_no_op() {
        let server = mock_telegram().await;
        let root = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(FakeDownload::Nothing);
        let state = test_state(&server, root.path(), fetcher.clone());

        let dispatched = WebhookService::handle(&state, update(Some("just chatting"))).await.unwrap();

        assert!(dispatched.is_none());
        assert!(bot_calls(&server).await.is_empty());
        assert!(fetcher.last_dest().is_none());
    }

    #[tokio::test]
    async fn missing_text_is_a_silent_no_op() {
        let server = mock_telegram().await;
        let root = tempfile::tempdir().unwrap();
        let state = test_state(&server, root.path(), FakeFetcher::new(FakeDownload::Nothing));

        let dispatched = WebhookService::handle(&state, update(None)).await.unwrap();

        assert!(dispatched.is_none());
        assert!(bot_calls(&server).await.is_empty());
    }

    #[tokio::test]
    async fn link_is_acknowledged_then_processed() {
        let server = mock_telegram().await;
        let root = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(FakeDownload::File {
            name: "report.pdf",
            size: 2048,
        });
        let state = test_state(&server, root.path(), fetcher.clone());

        let dispatched = WebhookService::handle(
            &state,
            update(Some("check this out https://mega.nz/file/abc123#key more text")),
        )
        .await
        .unwrap()
        .expect("job dispatched");

        assert_eq!(dispatched.job.chat_id, 42);
        assert_eq!(dispatched.job.mega_url, "https://mega.nz/file/abc123#key");

        dispatched.handle.await.unwrap();
        assert_eq!(bot_calls(&server).await, ["sendMessage", "sendDocument", "sendMessage"]);
        assert_eq!(sent_texts(&server).await, [ACK_TEXT, "✅ Done."]);
        assert!(!fetcher.last_dest().unwrap().exists());
    }

    #[tokio::test]
    async fn handle_returns_before_the_job_finishes() {
        let server = mock_telegram().await;
        let root = tempfile::tempdir().unwrap();
        let gate = Arc::new(Notify::new());
        let fetcher = FakeFetcher::new(FakeDownload::Gated {
            gate: gate.clone(),
            name: "movie.pdf",
            size: 64,
        });
        let state = test_state(&server, root.path(), fetcher.clone());

        let dispatched = WebhookService::handle(&state, update(Some("https://mega.nz/file/a#b")))
            .await
            .unwrap()
            .expect("job dispatched");

        assert!(!dispatched.handle.is_finished());
        assert_eq!(bot_calls(&server).await, ["sendMessage"]);

        gate.notify_one();
        dispatched.handle.await.unwrap();
        assert_eq!(bot_calls(&server).await, ["sendMessage", "sendDocument", "sendMessage"]);
        assert!(!fetcher.last_dest().unwrap().exists());
    }

    #[tokio::test]
    async fn failed_acknowledgement_dispatches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let root = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(FakeDownload::Nothing);
        let state = test_state(&server, root.path(), fetcher.clone());

        let result = WebhookService::handle(&state, update(Some("https://mega.nz/file/a#b"))).await;

        assert!(matches!(result, Err(TelegramError::Status { .. })));
        assert!(fetcher.last_dest().is_none());
    }
}
