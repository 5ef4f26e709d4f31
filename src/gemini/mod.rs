pub mod direct;
pub mod proxy;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ForgeConfig, RouterMode};
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::models::{ModelCategory, ModelInfo};
use crate::report::Reporter;

pub use direct::DirectClient;
pub use proxy::ProxyClient;
pub use types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, GeminiInlineData,
    GeminiPart, ImageConfig, to_wire_parts,
};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// One remote model invocation. Implemented by the router; pipelines
/// depend on this seam so tests can script responses.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(
        &self,
        request: GenerateContentRequest,
        feature: &str,
    ) -> Result<GenerateContentResponse>;
}

/// Chooses between the direct-to-provider and authenticated-proxy call
/// paths, and logs a usage record for every attempted invocation.
///
/// The router never retries; retry composes around it.
pub struct GeminiRouter {
    mode: RouterMode,
    direct: DirectClient,
    proxy: ProxyClient,
    identity: Option<Arc<dyn IdentityProvider>>,
    reporter: Reporter,
}

impl GeminiRouter {
    pub fn new(config: ForgeConfig, reporter: Reporter) -> Self {
        Self {
            mode: config.mode,
            direct: DirectClient::new(config.provider),
            proxy: ProxyClient::new(config.proxy),
            identity: None,
            reporter,
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn mode(&self) -> RouterMode {
        self.mode
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gemini-2.5-flash".to_string(),
                name: "Gemini 2.5 Flash".to_string(),
                provider: "Google".to_string(),
                category: ModelCategory::Text,
            },
            ModelInfo {
                id: "gemini-2.5-flash-lite".to_string(),
                name: "Gemini 2.5 Flash Lite".to_string(),
                provider: "Google".to_string(),
                category: ModelCategory::Text,
            },
            ModelInfo {
                id: "gemini-2.5-pro".to_string(),
                name: "Gemini 2.5 Pro".to_string(),
                provider: "Google".to_string(),
                category: ModelCategory::Vision,
            },
            ModelInfo {
                id: "gemini-2.5-flash-image".to_string(),
                name: "Gemini 2.5 Flash Image".to_string(),
                provider: "Google".to_string(),
                category: ModelCategory::Image,
            },
        ]
    }
}

#[async_trait]
impl ModelInvoker for GeminiRouter {
    async fn invoke(
        &self,
        request: GenerateContentRequest,
        feature: &str,
    ) -> Result<GenerateContentResponse> {
        // Cost exposure is logged per attempt, not gated on success.
        self.reporter.usage(&request.model, feature);

        match self.mode {
            RouterMode::Direct => self.direct.invoke(&request).await,
            RouterMode::Proxied => self.proxy.invoke(self.identity.as_ref(), &request).await,
        }
    }
}
