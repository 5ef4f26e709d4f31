pub mod cost;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::LedgerConfig;
use crate::error::{ForgeError, Result};
use crate::models::{ErrorEvent, UsageEvent};

/// Append-only sink for usage and error records. The pipeline never reads
/// anything back from it.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn record_usage(&self, event: &UsageEvent) -> Result<()>;
    async fn record_error(&self, event: &ErrorEvent) -> Result<()>;
}

/// Logs records instead of persisting them.
pub struct ConsoleSink;

#[async_trait]
impl EventSink for ConsoleSink {
    async fn record_usage(&self, event: &UsageEvent) -> Result<()> {
        log::info!(
            "usage: model={} feature={} cost=${:.4}",
            event.model_id,
            event.feature,
            event.estimated_cost_usd
        );
        Ok(())
    }

    async fn record_error(&self, event: &ErrorEvent) -> Result<()> {
        log::warn!("error ledger: source={} message={}", event.source, event.message);
        Ok(())
    }
}

/// Discards all records. Useful in tests.
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn record_usage(&self, _event: &UsageEvent) -> Result<()> {
        Ok(())
    }

    async fn record_error(&self, _event: &ErrorEvent) -> Result<()> {
        Ok(())
    }
}

/// Writes records to an external HTTP ledger.
pub struct LedgerSink {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl LedgerSink {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .ok_or_else(|| ForgeError::ConfigError("Ledger URL is required".into()))?;

        Ok(Self {
            client: Client::new(),
            base_url,
            token: config.token,
        })
    }

    fn build_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &self.token {
            if let Ok(value) = format!("Bearer {}", token).parse() {
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }
        }
        if let Ok(value) = "application/json".parse() {
            headers.insert(reqwest::header::CONTENT_TYPE, value);
        }
        headers
    }

    async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<()> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .headers(self.build_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| ForgeError::RequestError(format!("ledger request failed: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ForgeError::Upstream {
                status: response.status().as_u16(),
                message: format!("ledger rejected record: {}", response.status()),
            })
        }
    }
}

#[async_trait]
impl EventSink for LedgerSink {
    async fn record_usage(&self, event: &UsageEvent) -> Result<()> {
        self.post("/usage", event).await
    }

    async fn record_error(&self, event: &ErrorEvent) -> Result<()> {
        self.post("/errors", event).await
    }
}

/// Fire-and-forget reporting handle shared by the router and pipelines.
///
/// Every write is spawned off the caller's path; a sink failure is logged
/// and swallowed, never propagated, so reporting can't mask or abort the
/// remote call it describes.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn EventSink>,
    user_id: Option<String>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Record one attempted remote call, before the attempt is made.
    pub fn usage(&self, model_id: &str, feature: &str) {
        let event = UsageEvent::new(
            model_id,
            feature,
            self.user_id.clone(),
            cost::estimated_cost_usd(model_id),
        );
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.record_usage(&event).await {
                log::warn!("usage sink rejected event: {}", e);
            }
        });
    }

    /// Record one terminal failure.
    pub fn error(&self, source: &str, message: &str) {
        let event = ErrorEvent::new(source, message, self.user_id.clone());
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.record_error(&event).await {
                log::warn!("error sink rejected event: {}", e);
            }
        });
    }
}
