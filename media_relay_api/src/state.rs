use std::sync::Arc;

use prism_ytdlp::{AudioStreamSource, YtDlpSource};

use crate::config;

#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,

    pub http_client: reqwest::Client,
    pub audio_source: Arc<dyn AudioStreamSource + Send + Sync>,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let http_client_agent = config.http_client_agent.clone();
        let ytdlp_path = config.ytdlp_path.clone();

        Self {
            config,

            http_client: reqwest::Client::builder()
                .user_agent(http_client_agent)
                .connection_verbose(false)
                .build()
                .expect("failed to create http client"),

            audio_source: Arc::new(YtDlpSource::new(ytdlp_path)),
        }
    }
}
