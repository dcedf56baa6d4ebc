//! Shared application state.

use std::sync::Arc;

use anyhow::Context;
use logshield_core::Redactor;
use tracing::info;

use crate::analysis::{AnalysisCache, AnalysisClient};
use crate::config::{ProxyConfig, DEFAULT_MAX_UPLOAD_BYTES};

/// Shared by every route handler.
pub struct AppState {
    pub redactor: Arc<Redactor>,
    pub analyzer: Option<AnalysisClient>,
    pub cache: AnalysisCache,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(redactor: Redactor) -> Self {
        Self {
            redactor: Arc::new(redactor),
            analyzer: None,
            cache: AnalysisCache::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_analyzer(mut self, analyzer: AnalysisClient) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn from_config(config: &ProxyConfig) -> anyhow::Result<Self> {
        let policy = config.load_policy()?;
        let redactor = Redactor::new(&policy).context("failed to compile redaction rules")?;
        info!(rules = redactor.registry().len(), "redaction registry ready");

        let mut state = Self::new(redactor).with_max_upload_bytes(config.max_upload_bytes);
        match &config.analyzer_url {
            Some(url) => {
                let client = AnalysisClient::new(url.clone(), config.analyzer_timeout)
                    .context("failed to build analysis client")?;
                info!(url = %url, "analysis service configured");
                state = state.with_analyzer(client);
            }
            None => info!("no analysis service configured, /api/analyze will mask only"),
        }
        Ok(state)
    }
}
