use std::sync::Arc;

use super::{
    advisory_json_call, advisory_vision_call, PipelineModels, StageOutcome, ERROR_SOURCE,
    IDENTITY_FALLBACK, SAFE_ZONE_DIRECTIVE,
};
use crate::error::{ForgeError, Result};
use crate::gemini::{
    to_wire_parts, GenerateContentRequest, GenerationConfig, ImageConfig, ModelInvoker,
};
use crate::logger;
use crate::models::{
    GenerationResult, ImageAsset, LabeledAsset, RequestPart, ThumbnailRequest, ThumbnailStrategy,
};
use crate::preprocess::{optimize, THUMBNAIL_MAX_DIMENSION};
use crate::prompt;
use crate::report::Reporter;
use crate::retry::{with_retry, RetryPolicy};

/// Terminal message when the synthesis response carries no image payload.
pub const RENDER_FAILURE_MESSAGE: &str =
    "Production engine failed to render. Request may be blocked.";

/// Thumbnail production: RESEARCH, then IDENTITY_EXTRACTION when a subject
/// image exists, then ASSEMBLE, then SYNTHESIZE. Stages run strictly in
/// sequence; the first two are advisory and degrade to fixed substitutes,
/// synthesis is terminal.
pub struct ThumbnailPipeline {
    invoker: Arc<dyn ModelInvoker>,
    reporter: Reporter,
    models: PipelineModels,
    retry: RetryPolicy,
}

impl ThumbnailPipeline {
    pub fn new(invoker: Arc<dyn ModelInvoker>, reporter: Reporter) -> Self {
        Self {
            invoker,
            reporter,
            models: PipelineModels::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_models(mut self, models: PipelineModels) -> Self {
        self.models = models;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Drive one request through the full pipeline.
    pub async fn produce(&self, request: &ThumbnailRequest) -> Result<GenerationResult> {
        let _timer = logger::timer("thumbnail_production");

        let strategy = self.research(request).await;
        if strategy.is_fallback() {
            log::debug!("research degraded to the default strategy");
        }
        let strategy = strategy.value();

        let identity_brief = match &request.subject_image {
            Some(subject) => Some(self.extract_identity(subject).await.value()),
            None => None,
        };

        let instruction = self.build_instruction(request, &strategy, identity_brief.as_deref());
        let parts = self.assemble(request, &instruction);

        self.synthesize(request, parts).await
    }

    async fn research(&self, request: &ThumbnailRequest) -> StageOutcome<ThumbnailStrategy> {
        let prompt = format!(
            "You are a thumbnail strategist for the \"{}\" category. Topic: \"{}\". \
             Respond with a JSON object with keys \"headline\" (max 4 punchy words), \
             \"colorStrategy\", \"compositionRule\" and \"vibe\".",
            request.category, request.title
        );

        advisory_json_call(
            &self.invoker,
            &self.reporter,
            self.retry,
            &self.models.research,
            "thumbnail_research",
            prompt,
            ThumbnailStrategy::fallback(),
        )
        .await
    }

    async fn extract_identity(&self, subject: &ImageAsset) -> StageOutcome<String> {
        let optimized = optimize(subject, THUMBNAIL_MAX_DIMENSION);
        advisory_vision_call(
            &self.invoker,
            &self.reporter,
            self.retry,
            &self.models.vision,
            "thumbnail_identity",
            "Give a forensic description of this person's distinguishing visual features: \
             face shape, hairstyle and color, facial hair, glasses, unique marks. \
             Plain text, no preamble."
                .to_string(),
            &optimized,
            "SUBJECT SOURCE",
            IDENTITY_FALLBACK,
        )
        .await
    }

    fn build_instruction(
        &self,
        request: &ThumbnailRequest,
        strategy: &ThumbnailStrategy,
        identity_brief: Option<&str>,
    ) -> String {
        let mut instruction = format!(
            "Produce a click-optimized \"{}\" thumbnail for the video titled \"{}\".\n\
             Headline text: {}\nColor strategy: {}\nComposition: {}\nVibe: {}",
            request.category,
            request.title,
            strategy.headline,
            strategy.color_strategy,
            strategy.composition_rule,
            strategy.vibe
        );

        if let Some(brief) = identity_brief {
            instruction.push_str(&format!("\n\nIDENTITY LOCK: {}", brief));
        }

        if request.aspect.is_vertical() {
            instruction.push_str(&format!("\n\n{}", SAFE_ZONE_DIRECTIVE));
        }

        instruction
    }

    fn assemble(
        &self,
        request: &ThumbnailRequest,
        instruction: &str,
    ) -> Vec<RequestPart> {
        let mandates = prompt::default_mandates();
        let brand = request.brand.as_ref();

        let auxiliary: Vec<LabeledAsset> = request
            .extra_assets
            .iter()
            .map(|labeled| {
                LabeledAsset::new(
                    optimize(&labeled.asset, THUMBNAIL_MAX_DIMENSION),
                    labeled.role.clone(),
                )
            })
            .collect();

        match &request.subject_image {
            Some(subject) => {
                let primary = optimize(subject, THUMBNAIL_MAX_DIMENSION);
                prompt::assemble(
                    &mandates,
                    brand,
                    &primary,
                    "subject source",
                    &auxiliary,
                    instruction,
                )
            }
            None => match auxiliary.split_first() {
                Some((first, rest)) => prompt::assemble(
                    &mandates,
                    brand,
                    &first.asset,
                    &first.role,
                    rest,
                    instruction,
                ),
                None => prompt::assemble_text_only(&mandates, brand, instruction),
            },
        }
    }

    async fn synthesize(
        &self,
        request: &ThumbnailRequest,
        parts: Vec<RequestPart>,
    ) -> Result<GenerationResult> {
        let generate = GenerateContentRequest::new(&self.models.image, to_wire_parts(&parts))
            .with_config(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect.as_str().to_string(),
                }),
                ..Default::default()
            });

        let response = with_retry(&self.reporter, ERROR_SOURCE, self.retry, || {
            let generate = generate.clone();
            async move { self.invoker.invoke(generate, "thumbnail_synthesis").await }
        })
        .await?;

        match response.first_image() {
            Some(image) => Ok(GenerationResult {
                image_data: image.data,
                mime_type: image.mime_type,
                model: self.models.image.clone(),
            }),
            None => {
                let err = ForgeError::RenderError(RENDER_FAILURE_MESSAGE.to_string());
                self.reporter.error(ERROR_SOURCE, RENDER_FAILURE_MESSAGE);
                Err(err)
            }
        }
    }
}
