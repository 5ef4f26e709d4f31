pub mod marketing;
pub mod thumbnail;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{ForgeError, Result};
use crate::gemini::{
    to_wire_parts, GenerateContentRequest, GenerationConfig, ModelInvoker, DEFAULT_IMAGE_MODEL,
    DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL,
};
use crate::models::{ImageAsset, RequestPart};
use crate::report::Reporter;
use crate::retry::{with_retry, RetryPolicy};

pub use marketing::{MarketingPackPipeline, PackAssetOutcome, PackOutcome};
pub use thumbnail::{ThumbnailPipeline, RENDER_FAILURE_MESSAGE};

/// Error-ledger source tag for every remote call made by the pipelines.
pub(crate) const ERROR_SOURCE: &str = "Gemini API";

/// Fixed identity brief substituted when identity extraction fails.
pub(crate) const IDENTITY_FALLBACK: &str = "Preserve identity exactly.";

/// Reserved regions of vertical/social frames, kept clear of text and key
/// graphics so platform UI doesn't cover them.
pub(crate) const SAFE_ZONE_DIRECTIVE: &str = "SAFE ZONE: Keep the top 15% and the bottom 25% \
of the frame free of text and key graphics; platform UI overlays those regions.";

/// How an advisory stage resolved: with the model's own answer, or with
/// the stage's fixed substitute. Terminal failures travel as `Err` and
/// never take this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    Resolved(T),
    Fallback(T),
}

impl<T> StageOutcome<T> {
    pub fn value(self) -> T {
        match self {
            StageOutcome::Resolved(v) | StageOutcome::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StageOutcome::Fallback(_))
    }
}

/// Model ids used by a pipeline's stages.
#[derive(Debug, Clone)]
pub struct PipelineModels {
    pub research: String,
    pub vision: String,
    pub image: String,
}

impl Default for PipelineModels {
    fn default() -> Self {
        Self {
            research: DEFAULT_TEXT_MODEL.to_string(),
            vision: DEFAULT_VISION_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

/// Parse a model's JSON answer, tolerating markdown code fences.
pub(crate) fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(stripped.trim())
        .map_err(|e| ForgeError::SerializationError(format!("model returned invalid JSON: {}", e)))
}

/// Run an advisory research call that must come back as JSON. Any failure,
/// including a parse failure, degrades to `fallback` instead of aborting.
pub(crate) async fn advisory_json_call<T: DeserializeOwned>(
    invoker: &Arc<dyn ModelInvoker>,
    reporter: &Reporter,
    policy: RetryPolicy,
    model: &str,
    feature: &str,
    prompt: String,
    fallback: T,
) -> StageOutcome<T> {
    let request = GenerateContentRequest::new(
        model,
        to_wire_parts(&[RequestPart::Text(prompt)]),
    )
    .with_config(GenerationConfig {
        response_mime_type: Some("application/json".to_string()),
        ..Default::default()
    });

    let reply = with_retry(reporter, ERROR_SOURCE, policy, || {
        let request = request.clone();
        async move { invoker.invoke(request, feature).await }
    })
    .await;

    match reply {
        Ok(response) => match response.first_text().map(parse_json_reply::<T>) {
            Some(Ok(parsed)) => StageOutcome::Resolved(parsed),
            Some(Err(e)) => {
                log::debug!("{} reply unusable, using fallback: {}", feature, e);
                StageOutcome::Fallback(fallback)
            }
            None => {
                log::debug!("{} reply carried no text, using fallback", feature);
                StageOutcome::Fallback(fallback)
            }
        },
        Err(e) => {
            log::debug!("{} failed, using fallback: {}", feature, e);
            StageOutcome::Fallback(fallback)
        }
    }
}

/// Run an advisory vision call over one reference image, expecting free
/// text back. Any failure degrades to `fallback`.
pub(crate) async fn advisory_vision_call(
    invoker: &Arc<dyn ModelInvoker>,
    reporter: &Reporter,
    policy: RetryPolicy,
    model: &str,
    feature: &str,
    prompt: String,
    asset: &ImageAsset,
    role: &str,
    fallback: &str,
) -> StageOutcome<String> {
    let request = GenerateContentRequest::new(
        model,
        to_wire_parts(&[
            RequestPart::Image {
                asset: asset.clone(),
                role: role.to_string(),
            },
            RequestPart::Text(prompt),
        ]),
    );

    let reply = with_retry(reporter, ERROR_SOURCE, policy, || {
        let request = request.clone();
        async move { invoker.invoke(request, feature).await }
    })
    .await;

    match reply {
        Ok(response) => match response.first_text() {
            Some(text) if !text.trim().is_empty() => {
                StageOutcome::Resolved(text.trim().to_string())
            }
            _ => {
                log::debug!("{} reply carried no text, using fallback", feature);
                StageOutcome::Fallback(fallback.to_string())
            }
        },
        Err(e) => {
            log::debug!("{} failed, using fallback: {}", feature, e);
            StageOutcome::Fallback(fallback.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThumbnailStrategy;

    #[test]
    fn test_parse_json_reply_plain() {
        let parsed: ThumbnailStrategy = parse_json_reply(
            r#"{"headline":"GO","colorStrategy":"Red","compositionRule":"Thirds","vibe":"Calm"}"#,
        )
        .unwrap();
        assert_eq!(parsed.headline, "GO");
    }

    #[test]
    fn test_parse_json_reply_fenced() {
        let fenced = "```json\n{\"headline\":\"GO\",\"colorStrategy\":\"Red\",\"compositionRule\":\"Thirds\",\"vibe\":\"Calm\"}\n```";
        let parsed: ThumbnailStrategy = parse_json_reply(fenced).unwrap();
        assert_eq!(parsed.vibe, "Calm");
    }

    #[test]
    fn test_parse_json_reply_garbage_errors() {
        let result: Result<ThumbnailStrategy> = parse_json_reply("no json here");
        assert!(result.is_err());
    }

    #[test]
    fn test_stage_outcome_accessors() {
        let resolved = StageOutcome::Resolved(1);
        let fallback = StageOutcome::Fallback(2);
        assert!(!resolved.is_fallback());
        assert!(fallback.is_fallback());
        assert_eq!(resolved.value(), 1);
        assert_eq!(fallback.value(), 2);
    }
}
