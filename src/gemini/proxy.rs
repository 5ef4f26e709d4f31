use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::config::ProxyConfig;
use crate::error::{ForgeError, Result};
use crate::identity::IdentityProvider;

const GENERATE_PATH: &str = "/api/generate";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Authenticated backend-proxy call path. The proxy holds the provider
/// credentials; this client only forwards the caller's bearer token.
pub struct ProxyClient {
    config: ProxyConfig,
}

impl ProxyClient {
    pub fn new(config: ProxyConfig) -> Self {
        Self { config }
    }

    fn build_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ForgeError::RequestError(format!("client construction failed: {}", e)))
    }

    pub async fn invoke(
        &self,
        identity: Option<&Arc<dyn IdentityProvider>>,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        // Fail fast before any network traffic.
        let identity = identity.ok_or_else(|| {
            ForgeError::AuthError("You must be logged in to use this feature.".into())
        })?;

        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| ForgeError::ConfigError("Proxy base URL is required".into()))?;

        // Token is fetched fresh per call; credentials may rotate.
        let token = identity.bearer_token().await?;

        log::debug!("invoking model via proxy: {}", request.model);

        let response = self
            .build_client()?
            .post(format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token),
            )
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
                message: extract_proxy_error(&body, status.as_u16()),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ForgeError::ResponseError(format!("unparsable proxy response: {}", e)))
    }
}

/// The proxy reports failures as a JSON `{"error": "..."}` body; anything
/// else degrades to a generic status line.
fn extract_proxy_error(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| format!("Server Error: {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_proxy_error_message() {
        let body = r#"{"error": "Quota exceeded for this billing period."}"#;
        assert_eq!(
            extract_proxy_error(body, 402),
            "Quota exceeded for this billing period."
        );
    }

    #[test]
    fn test_extract_proxy_error_fallback() {
        assert_eq!(extract_proxy_error("busted", 500), "Server Error: 500");
        assert_eq!(extract_proxy_error(r#"{"detail": "?"}"#, 503), "Server Error: 503");
    }
}
