//! Application state.

use std::sync::Arc;

use mediajob_speech::{build_recognizer, RecognizerConfig};
use mediajob_storage::{AssetFetcher, StorageClient};
use mediajob_worker::{JobPipeline, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<JobPipeline>,
    /// Probed by the readiness check; absent when publishing is stubbed out
    pub storage: Option<Arc<StorageClient>>,
    /// Client used for webhook deliveries
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let worker_config = WorkerConfig::from_env();
        tokio::fs::create_dir_all(&worker_config.work_dir).await?;

        let storage = Arc::new(StorageClient::from_env().await?);
        let recognizer = build_recognizer(
            &RecognizerConfig::from_env()?,
            Some(worker_config.engine_timeout_secs()),
        )?;
        let fetcher = AssetFetcher::new(worker_config.asset_prefix.clone())?;
        let pipeline = JobPipeline::new(worker_config, fetcher, recognizer, storage.clone());

        Ok(Self::from_parts(config, Arc::new(pipeline), Some(storage)))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        config: ApiConfig,
        pipeline: Arc<JobPipeline>,
        storage: Option<Arc<StorageClient>>,
    ) -> Self {
        Self {
            config,
            pipeline,
            storage,
            http: reqwest::Client::new(),
        }
    }
}
