use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Append-only record of one attempted remote call. Written exactly once
/// per attempt regardless of outcome.
#[derive(Debug, Clone, Serialize)]
pub struct UsageEvent {
    pub id: String,
    pub model_id: String,
    pub feature: String,
    pub user_id: Option<String>,
    pub estimated_cost_usd: f64,
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(
        model_id: impl Into<String>,
        feature: impl Into<String>,
        user_id: Option<String>,
        estimated_cost_usd: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            model_id: model_id.into(),
            feature: feature.into(),
            user_id,
            estimated_cost_usd,
            timestamp: Utc::now(),
        }
    }
}

/// Record of one terminal (non-retried-away) failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub id: String,
    pub source: String,
    pub message: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEvent {
    pub fn new(
        source: impl Into<String>,
        message: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            message: message.into(),
            user_id,
            timestamp: Utc::now(),
        }
    }
}
