use crate::infrastructure::telegram::TelegramClient;
use crate::middleware::task_key::TASK_KEY_HEADER;
use crate::modules::task::events::RelayJob;
use crate::workers::relay::RelayProcessor;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use url::Url;

/// Upper bound for a remote `/task/process` round trip (download + upload).
pub const REMOTE_TASK_TIMEOUT: Duration = Duration::from_secs(1800);

/// Hands a job to the processor without waiting for it.
#[derive(Clone)]
pub enum TaskDispatcher {
    InProcess(RelayProcessor),
    /// POSTs the job to another instance's `/task/process`.
    /// A failed handoff is reported to the chat.
    Remote {
        http: reqwest::Client,
        telegram: TelegramClient,
        endpoint: Url,
        task_key: String,
    },
}

impl TaskDispatcher {
    pub fn in_process(processor: RelayProcessor) -> Self {
        TaskDispatcher::InProcess(processor)
    }

    pub fn remote(
        telegram: TelegramClient,
        endpoint: Url,
        task_key: String,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REMOTE_TASK_TIMEOUT)
            .build()?;

        Ok(TaskDispatcher::Remote {
            http,
            telegram,
            endpoint,
            task_key,
        })
    }

    /// Spawn the job and return immediately. The handle is only awaited in tests.
    pub fn dispatch(&self, job: RelayJob) -> JoinHandle<()> {
        match self.clone() {
            TaskDispatcher::InProcess(processor) => tokio::spawn(async move {
                let outcome = processor.process(&job).await;
                info!(chat_id = job.chat_id, ok = outcome.ok(), %outcome, "In-process job done");
            }),
            TaskDispatcher::Remote {
                http,
                telegram,
                endpoint,
                task_key,
            } => tokio::spawn(async move {
                info!(chat_id = job.chat_id, endpoint = %endpoint, "Forwarding job");
                let result = http
                    .post(endpoint.clone())
                    .header(TASK_KEY_HEADER, task_key)
                    .json(&job)
                    .send()
                    .await;

                let reason = match result {
                    Ok(response) if response.status().is_success() => {
                        info!(chat_id = job.chat_id, "Remote job done");
                        return;
                    }
                    Ok(response) => {
                        warn!(chat_id = job.chat_id, status = %response.status(), "Task endpoint rejected job");
                        format!("task endpoint returned {}", response.status())
                    }
                    Err(e) => {
                        error!(chat_id = job.chat_id, error = %e, "Task endpoint unreachable");
                        format!("task endpoint unreachable: {}", e.without_url())
                    }
                };

                if let Err(e) = telegram
                    .send_message(job.chat_id, &format!("❌ Failed: {reason}"))
                    .await
                {
                    error!(chat_id = job.chat_id, error = ?e, "Could not report failure to chat");
                }
            }),
        }
    }
}
