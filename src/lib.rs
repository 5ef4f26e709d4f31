pub mod config;
pub mod error;
pub mod gemini;
pub mod identity;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod prompt;
pub mod report;
pub mod retry;

pub use config::{ForgeConfig, LedgerConfig, ProviderConfig, ProxyConfig, RouterMode};
pub use error::{ForgeError, Result};
pub use gemini::{GeminiRouter, ModelInvoker};
pub use identity::{IdentityProvider, StaticIdentity};
pub use models::*;
pub use pipeline::{
    MarketingPackPipeline, PackAssetOutcome, PackOutcome, PipelineModels, StageOutcome,
    ThumbnailPipeline,
};
pub use report::{ConsoleSink, EventSink, LedgerSink, NullSink, Reporter};
pub use retry::{with_retry, RetryPolicy};
