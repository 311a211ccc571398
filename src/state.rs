use crate::config::settings::AppConfig;
use crate::infrastructure::mega::{MegadlFetcher, RemoteFetcher};
use crate::infrastructure::telegram::TelegramClient;
use crate::workers::dispatcher::TaskDispatcher;
use crate::workers::relay::RelayProcessor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub telegram: TelegramClient,
    pub processor: RelayProcessor,
    pub dispatcher: TaskDispatcher,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let fetcher = Arc::new(MegadlFetcher::new(config.megadl_bin.clone()));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: AppConfig, fetcher: Arc<dyn RemoteFetcher>) -> anyhow::Result<Self> {
        let telegram = TelegramClient::new(&config.telegram_api_base, &config.bot_token)?;
        let processor = RelayProcessor::new(telegram.clone(), fetcher, config.scratch_root.clone());

        let dispatcher = match &config.task_endpoint {
            Some(endpoint) => TaskDispatcher::remote(
                telegram.clone(),
                endpoint.clone(),
                config.task_secret.clone(),
            )?,
            None => TaskDispatcher::in_process(processor.clone()),
        };

        Ok(Self {
            config,
            telegram,
            processor,
            dispatcher,
        })
    }
}
