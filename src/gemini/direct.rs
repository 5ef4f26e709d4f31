use std::time::Duration;

use reqwest::Client;

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::config::ProviderConfig;
use crate::error::{ForgeError, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Direct-to-provider call path.
pub struct DirectClient {
    config: ProviderConfig,
}

impl DirectClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    /// Build a fresh HTTP client for one call. Intentional
    /// no-connection-reuse policy: credentials may rotate per call, so
    /// nothing is pooled or cached across invocations.
    fn build_client(&self) -> Result<Client> {
        let timeout = self
            .config
            .request_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| ForgeError::RequestError(format!("client construction failed: {}", e)))
    }

    pub async fn invoke(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ForgeError::ConfigError("Provider API key is required".into()))?;

        let base = self.config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base.trim_end_matches('/'),
            request.model
        );

        log::debug!("invoking model directly: {}", request.model);

        let response = self
            .build_client()?
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ForgeError::RequestError(format!("network error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ForgeError::ResponseError(format!("body read failed: {}", e)))?;

        if !status.is_success() {
            return Err(ForgeError::Upstream {
                status: status.as_u16(),
                message: extract_provider_error(&body, status.as_u16()),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ForgeError::ResponseError(format!("unparsable provider response: {}", e)))
    }
}

/// Pull the human-readable message out of a provider error body, falling
/// back to a generic status line when the body is unparsable.
fn extract_provider_error(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| format!("Server Error: {}", status))
}
