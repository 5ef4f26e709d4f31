//! End-to-end pipeline scenarios against a scripted model invoker.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pixelforge::gemini::{GenerateContentRequest, GenerateContentResponse, GeminiPart};
use pixelforge::pipeline::RENDER_FAILURE_MESSAGE;
use pixelforge::{
    AspectRatio, BrandProfile, ErrorEvent, EventSink, ForgeConfig, ForgeError, GeminiRouter,
    ImageAsset, MarketingPackPipeline, MarketingPackRequest, ModelInvoker, ProviderConfig,
    Reporter, Result, RetryPolicy, ThumbnailPipeline, ThumbnailRequest, UsageEvent,
};

struct RecordedCall {
    feature: String,
    request: GenerateContentRequest,
}

/// Replays a scripted queue of responses and records every call.
struct MockInvoker {
    responses: Mutex<VecDeque<Result<GenerateContentResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockInvoker {
    fn new(responses: Vec<Result<GenerateContentResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn features(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.feature.clone())
            .collect()
    }

    /// Concatenated text parts of the recorded call for `feature`.
    fn instruction_text(&self, feature: &str) -> String {
        let calls = self.calls.lock().unwrap();
        let call = calls
            .iter()
            .find(|c| c.feature == feature)
            .unwrap_or_else(|| panic!("no call recorded for feature {}", feature));
        call.request
            .contents
            .parts
            .iter()
            .filter_map(|p| match p {
                GeminiPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl ModelInvoker for MockInvoker {
    async fn invoke(
        &self,
        request: GenerateContentRequest,
        feature: &str,
    ) -> Result<GenerateContentResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            feature: feature.to_string(),
            request,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock invoker script exhausted")
    }
}

struct RecordingSink {
    usage: Mutex<Vec<UsageEvent>>,
    errors: Mutex<Vec<ErrorEvent>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            usage: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn record_usage(&self, event: &UsageEvent) -> Result<()> {
        self.usage.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn record_error(&self, event: &ErrorEvent) -> Result<()> {
        self.errors.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn text_response(text: &str) -> Result<GenerateContentResponse> {
    let body = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    });
    Ok(serde_json::from_value(body).unwrap())
}

fn image_response() -> Result<GenerateContentResponse> {
    let body = serde_json::json!({
        "candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": "cGl4ZWxz"}}
        ]}}]
    });
    Ok(serde_json::from_value(body).unwrap())
}

fn network_error() -> Result<GenerateContentResponse> {
    Err(ForgeError::RequestError(
        "network error: connection reset".into(),
    ))
}

fn strategy_json() -> &'static str {
    r#"{"headline":"SILENT UPGRADE","colorStrategy":"Teal on slate","compositionRule":"Leading lines","vibe":"Calm"}"#
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, 1)
}

fn sample_request() -> ThumbnailRequest {
    ThumbnailRequest {
        category: "Technology".to_string(),
        title: "This tiny board replaced my server rack".to_string(),
        aspect: AspectRatio::Landscape,
        subject_image: None,
        extra_assets: vec![],
        brand: None,
    }
}

fn pipeline(mock: &Arc<MockInvoker>, reporter: Reporter) -> ThumbnailPipeline {
    let invoker: Arc<dyn ModelInvoker> = mock.clone();
    ThumbnailPipeline::new(invoker, reporter).with_retry_policy(fast_retry())
}

fn pack_pipeline(mock: &Arc<MockInvoker>, reporter: Reporter) -> MarketingPackPipeline {
    let invoker: Arc<dyn ModelInvoker> = mock.clone();
    MarketingPackPipeline::new(invoker, reporter).with_retry_policy(fast_retry())
}

fn null_reporter() -> Reporter {
    Reporter::new(Arc::new(pixelforge::NullSink))
}

// Scenario A: research rejects with a network error; the pipeline proceeds
// on the fixed default strategy and synthesis still runs.
#[tokio::test]
async fn research_failure_degrades_to_default_strategy() {
    let mock = MockInvoker::new(vec![
        network_error(),
        network_error(),
        network_error(),
        network_error(),
        image_response(),
    ]);

    let result = pipeline(&mock, null_reporter())
        .produce(&sample_request())
        .await
        .unwrap();
    assert_eq!(result.image_data, "cGl4ZWxz");

    let features = mock.features();
    assert_eq!(
        features,
        vec![
            "thumbnail_research",
            "thumbnail_research",
            "thumbnail_research",
            "thumbnail_research",
            "thumbnail_synthesis"
        ]
    );

    let instruction = mock.instruction_text("thumbnail_synthesis");
    assert!(instruction.contains("UNBELIEVABLE RESULT"));
    assert!(instruction.contains("High-contrast Yellow and Black"));
    assert!(instruction.contains("Rule of Thirds"));
    assert!(instruction.contains("Intense"));
}

// Scenario B: without a subject image the vision model is never called and
// no identity brief appears; with one, the brief is embedded verbatim.
#[tokio::test]
async fn identity_extraction_is_skipped_without_subject_image() {
    let mock = MockInvoker::new(vec![text_response(strategy_json()), image_response()]);

    pipeline(&mock, null_reporter())
        .produce(&sample_request())
        .await
        .unwrap();

    let features = mock.features();
    assert!(!features.iter().any(|f| f == "thumbnail_identity"));
    assert!(!mock
        .instruction_text("thumbnail_synthesis")
        .contains("IDENTITY LOCK"));
}

#[tokio::test]
async fn identity_brief_is_embedded_when_subject_supplied() {
    let mock = MockInvoker::new(vec![
        text_response(strategy_json()),
        text_response("Square jaw, silver hair, round glasses."),
        image_response(),
    ]);

    let mut request = sample_request();
    request.subject_image = Some(ImageAsset::new("c3ViamVjdA==", "image/jpeg"));

    pipeline(&mock, null_reporter()).produce(&request).await.unwrap();

    assert!(mock.features().iter().any(|f| f == "thumbnail_identity"));
    let instruction = mock.instruction_text("thumbnail_synthesis");
    assert!(instruction.contains("IDENTITY LOCK: Square jaw, silver hair, round glasses."));
}

#[tokio::test]
async fn failed_identity_extraction_falls_back_to_fixed_brief() {
    let mock = MockInvoker::new(vec![
        text_response(strategy_json()),
        Err(ForgeError::Upstream {
            status: 400,
            message: "vision model rejected the image".into(),
        }),
        image_response(),
    ]);

    let mut request = sample_request();
    request.subject_image = Some(ImageAsset::new("c3ViamVjdA==", "image/jpeg"));

    pipeline(&mock, null_reporter()).produce(&request).await.unwrap();

    let instruction = mock.instruction_text("thumbnail_synthesis");
    assert!(instruction.contains("IDENTITY LOCK: Preserve identity exactly."));
}

// Scenario C: a synthesis response with no image payload is terminal, with
// the exact render-failure message, and the attempt stays in the ledger.
#[tokio::test]
async fn missing_image_payload_is_a_terminal_failure() {
    let sink = RecordingSink::new();
    let mock = MockInvoker::new(vec![
        text_response(strategy_json()),
        text_response("I cannot render that."),
    ]);

    let err = pipeline(&mock, Reporter::new(sink.clone()))
        .produce(&sample_request())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), RENDER_FAILURE_MESSAGE);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let errors = sink.errors.lock().unwrap();
    assert!(errors.iter().any(|e| e.message == RENDER_FAILURE_MESSAGE));
    assert!(errors.iter().all(|e| e.source == "Gemini API"));
}

// Scenario D: proxied mode with no authenticated identity rejects before
// any network attempt.
#[tokio::test]
async fn proxied_mode_without_identity_rejects_immediately() {
    let config = ForgeConfig::new()
        .with_proxy(pixelforge::ProxyConfig::new().with_base_url("http://127.0.0.1:9"));
    let router = GeminiRouter::new(config, null_reporter());

    let err = router
        .invoke(
            GenerateContentRequest::new("gemini-2.5-flash-image", vec![]),
            "thumbnail_synthesis",
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "You must be logged in to use this feature.");
}

// Usage is recorded for attempted cost exposure, not gated on success.
#[tokio::test]
async fn usage_is_logged_even_when_the_call_fails() {
    let sink = RecordingSink::new();
    let config = ForgeConfig::new().with_provider(
        ProviderConfig::new()
            .with_api_key("test-key")
            .with_api_base("http://127.0.0.1:9")
            .with_request_timeout(2),
    );
    let router = GeminiRouter::new(config, Reporter::new(sink.clone()));

    let result = router
        .invoke(
            GenerateContentRequest::new("gemini-2.5-flash", vec![]),
            "thumbnail_research",
        )
        .await;
    assert!(result.is_err());

    tokio::time::sleep(Duration::from_millis(20)).await;
    let usage = sink.usage.lock().unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].model_id, "gemini-2.5-flash");
    assert_eq!(usage[0].feature, "thumbnail_research");
}

#[tokio::test]
async fn brand_directive_flows_into_synthesis_payload() {
    let mock = MockInvoker::new(vec![text_response(strategy_json()), image_response()]);

    let mut request = sample_request();
    request.brand = Some(BrandProfile {
        display_name: "Northwind".to_string(),
        tone_of_voice: None,
        color_primary: "#0A3D62".to_string(),
        color_accent: "#F6B93B".to_string(),
        heading_font: None,
    });

    pipeline(&mock, null_reporter()).produce(&request).await.unwrap();

    let instruction = mock.instruction_text("thumbnail_synthesis");
    assert!(instruction.contains("BRAND DIRECTIVE"));
    assert!(instruction.contains("Northwind"));
    assert!(instruction.contains("Tone of voice: Professional"));
}

#[tokio::test]
async fn safe_zone_directive_applies_to_vertical_formats_only() {
    let mock = MockInvoker::new(vec![text_response(strategy_json()), image_response()]);
    let mut request = sample_request();
    request.aspect = AspectRatio::Vertical;

    pipeline(&mock, null_reporter()).produce(&request).await.unwrap();
    assert!(mock
        .instruction_text("thumbnail_synthesis")
        .contains("top 15%"));

    let mock = MockInvoker::new(vec![text_response(strategy_json()), image_response()]);
    pipeline(&mock, null_reporter())
        .produce(&sample_request())
        .await
        .unwrap();
    assert!(!mock
        .instruction_text("thumbnail_synthesis")
        .contains("SAFE ZONE"));
}

// Marketing pack: one asset's render failure leaves its siblings intact.
#[tokio::test]
async fn marketing_pack_collects_independent_asset_outcomes() {
    let plan = r#"{
        "concept": "Dawn launch",
        "assets": [
            {"name": "Wide banner", "format": "banner", "aspectRatio": "16:9",
             "instruction": "Bottle on a cliff at sunrise."},
            {"name": "Vertical story", "format": "story", "aspectRatio": "9:16",
             "instruction": "Bottle held toward the light."}
        ]
    }"#;
    let mock = MockInvoker::new(vec![
        text_response(plan),
        image_response(),
        text_response("refused"),
    ]);

    let request = MarketingPackRequest {
        campaign_brief: "Launch the dawn edition".to_string(),
        category: "Beverage".to_string(),
        product_image: None,
        extra_assets: vec![],
        brand: None,
    };

    let outcome = pack_pipeline(&mock, null_reporter())
        .produce(&request)
        .await
        .unwrap();

    assert_eq!(outcome.concept, "Dawn launch");
    assert_eq!(outcome.assets.len(), 2);
    assert!(outcome.assets[0].outcome.is_ok());
    let err = outcome.assets[1].outcome.as_ref().unwrap_err();
    assert_eq!(err.to_string(), RENDER_FAILURE_MESSAGE);
}

#[tokio::test]
async fn marketing_pack_planning_failure_uses_default_plan() {
    let mock = MockInvoker::new(vec![
        Err(ForgeError::Upstream {
            status: 400,
            message: "planning rejected".into(),
        }),
        image_response(),
        image_response(),
        image_response(),
    ]);

    let request = MarketingPackRequest {
        campaign_brief: "Launch the dawn edition".to_string(),
        category: "Beverage".to_string(),
        product_image: None,
        extra_assets: vec![],
        brand: None,
    };

    let outcome = pack_pipeline(&mock, null_reporter())
        .produce(&request)
        .await
        .unwrap();

    assert_eq!(outcome.assets.len(), 3);
    assert!(outcome.assets.iter().all(|a| a.outcome.is_ok()));
    let features = mock.features();
    assert_eq!(features.iter().filter(|f| *f == "pack_synthesis").count(), 3);
}
