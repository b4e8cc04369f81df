pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    completion_client::{CompletionClient, OpenAiCompletionClient},
    generation_service::{GenerationPolicy, GenerationService},
    grading_service::GradingService,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generation_service: GenerationService,
    pub grading_service: GradingService,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.upstream_timeout_secs);
        let http_client = Client::builder().timeout(timeout).build()?;

        let client: Arc<dyn CompletionClient> = Arc::new(
            OpenAiCompletionClient::new(
                http_client,
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
                config.openai_model.clone(),
            )
            .with_timeout(timeout),
        );
        Ok(Self::with_client(config, client))
    }

    /// Builds the state around an already constructed completion client.
    pub fn with_client(config: &Config, client: Arc<dyn CompletionClient>) -> Self {
        let policy = GenerationPolicy {
            normalize_mode: config.normalize_mode,
            ..GenerationPolicy::default()
        };
        let generation_service =
            GenerationService::new(client.clone(), policy).with_mock(config.use_mock);
        let grading_service = GradingService::new(client).with_mock(config.use_mock);

        Self {
            config: Arc::new(config.clone()),
            generation_service,
            grading_service,
        }
    }
}
