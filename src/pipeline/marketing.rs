use std::sync::Arc;

use futures::future::join_all;

use super::{
    advisory_json_call, advisory_vision_call, PipelineModels, ERROR_SOURCE, IDENTITY_FALLBACK,
    SAFE_ZONE_DIRECTIVE,
};
use crate::error::{ForgeError, Result};
use crate::gemini::{
    to_wire_parts, GenerateContentRequest, GenerationConfig, ImageConfig, ModelInvoker,
};
use crate::logger;
use crate::models::{
    AspectRatio, GenerationResult, ImageAsset, LabeledAsset, MarketingPackRequest, PackPlan,
    PlannedAsset, RequestPart,
};
use crate::preprocess::{optimize, PRODUCTION_MAX_DIMENSION};
use crate::prompt;
use crate::report::Reporter;
use crate::retry::{with_retry, RetryPolicy};

use super::thumbnail::RENDER_FAILURE_MESSAGE;

/// Outcome of one marketing pack run. Assets fail independently: one
/// rejected render does not abort its siblings.
#[derive(Debug)]
pub struct PackOutcome {
    pub concept: String,
    pub assets: Vec<PackAssetOutcome>,
}

#[derive(Debug)]
pub struct PackAssetOutcome {
    pub name: String,
    pub format: String,
    pub outcome: Result<GenerationResult>,
}

/// Marketing pack production: one planning call shapes N assets, an
/// optional product-identity pass locks the hero product's appearance,
/// then each planned asset is synthesized through the shared
/// assembler/retry/router stack.
pub struct MarketingPackPipeline {
    invoker: Arc<dyn ModelInvoker>,
    reporter: Reporter,
    models: PipelineModels,
    retry: RetryPolicy,
}

impl MarketingPackPipeline {
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

    /// Plan the pack, then produce every planned asset.
    pub async fn produce(&self, request: &MarketingPackRequest) -> Result<PackOutcome> {
        let _timer = logger::timer("marketing_pack_production");

        let plan = self.plan(request).await;

        let identity_brief = match &request.product_image {
            Some(product) => Some(self.extract_product_identity(product).await),
            None => None,
        };

        // Planned assets are independent sub-requests; they synthesize
        // concurrently while the plan itself stays strictly sequential.
        let syntheses = plan.assets.iter().map(|planned| {
            self.produce_asset(request, &plan.concept, planned, identity_brief.as_deref())
        });
        let assets = join_all(syntheses).await;

        Ok(PackOutcome {
            concept: plan.concept,
            assets,
        })
    }

    async fn plan(&self, request: &MarketingPackRequest) -> PackPlan {
        let prompt = format!(
            "You are a campaign art director for the \"{}\" category. Campaign brief: \"{}\". \
             Plan a marketing image pack as a JSON object with keys \"concept\" and \"assets\"; \
             each asset has \"name\", \"format\", \"aspectRatio\" (one of \"16:9\", \"1:1\", \
             \"9:16\") and \"instruction\".",
            request.category, request.campaign_brief
        );

        let outcome = advisory_json_call(
            &self.invoker,
            &self.reporter,
            self.retry,
            &self.models.research,
            "pack_planning",
            prompt,
            PackPlan::fallback(&request.campaign_brief),
        )
        .await;

        if outcome.is_fallback() {
            log::debug!("pack planning degraded to the default plan");
        }

        let plan = outcome.value();
        if plan.assets.is_empty() {
            // A plan with nothing to produce is as useless as no plan.
            return PackPlan::fallback(&request.campaign_brief);
        }
        plan
    }

    async fn extract_product_identity(&self, product: &ImageAsset) -> String {
        let optimized = optimize(product, PRODUCTION_MAX_DIMENSION);
        advisory_vision_call(
            &self.invoker,
            &self.reporter,
            self.retry,
            &self.models.vision,
            "pack_identity",
            "Give a forensic description of this product's distinguishing visual features: \
             silhouette, materials, colors, label text, unique marks. Plain text, no preamble."
                .to_string(),
            &optimized,
            "PRODUCT SOURCE",
            IDENTITY_FALLBACK,
        )
        .await
        .value()
    }

    async fn produce_asset(
        &self,
        request: &MarketingPackRequest,
        concept: &str,
        planned: &PlannedAsset,
        identity_brief: Option<&str>,
    ) -> PackAssetOutcome {
        let aspect = AspectRatio::from_label(&planned.aspect_ratio).unwrap_or(AspectRatio::Square);
        let instruction = build_asset_instruction(concept, planned, identity_brief, aspect);
        let parts = self.assemble(request, &instruction);

        PackAssetOutcome {
            name: planned.name.clone(),
            format: planned.format.clone(),
            outcome: self.synthesize(parts, aspect).await,
        }
    }

    fn assemble(&self, request: &MarketingPackRequest, instruction: &str) -> Vec<RequestPart> {
        let mandates = prompt::default_mandates();
        let brand = request.brand.as_ref();

        let auxiliary: Vec<LabeledAsset> = request
            .extra_assets
            .iter()
            .map(|labeled| {
                LabeledAsset::new(
                    optimize(&labeled.asset, PRODUCTION_MAX_DIMENSION),
                    labeled.role.clone(),
                )
            })
            .collect();

        match &request.product_image {
            Some(product) => {
                let primary = optimize(product, PRODUCTION_MAX_DIMENSION);
                prompt::assemble(
                    &mandates,
                    brand,
                    &primary,
                    "product source",
                    &auxiliary,
                    instruction,
                )
            }
            None => match auxiliary.split_first() {
                Some((first, rest)) => {
                    prompt::assemble(&mandates, brand, &first.asset, &first.role, rest, instruction)
                }
                None => prompt::assemble_text_only(&mandates, brand, instruction),
            },
        }
    }

    async fn synthesize(
        &self,
        parts: Vec<RequestPart>,
        aspect: AspectRatio,
    ) -> Result<GenerationResult> {
        let generate = GenerateContentRequest::new(&self.models.image, to_wire_parts(&parts))
            .with_config(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: aspect.as_str().to_string(),
                }),
                ..Default::default()
            });

        let response = with_retry(&self.reporter, ERROR_SOURCE, self.retry, || {
            let generate = generate.clone();
            async move { self.invoker.invoke(generate, "pack_synthesis").await }
        })
        .await?;

        match response.first_image() {
            Some(image) => Ok(GenerationResult {
                image_data: image.data,
                mime_type: image.mime_type,
                model: self.models.image.clone(),
            }),
            None => {
                self.reporter.error(ERROR_SOURCE, RENDER_FAILURE_MESSAGE);
                Err(ForgeError::RenderError(RENDER_FAILURE_MESSAGE.to_string()))
            }
        }
    }
}

fn build_asset_instruction(
    concept: &str,
    planned: &PlannedAsset,
    identity_brief: Option<&str>,
    aspect: AspectRatio,
) -> String {
    let mut instruction = format!(
        "Produce the \"{}\" asset ({}) of a marketing pack.\nPack concept: {}\n{}",
        planned.name, planned.format, concept, planned.instruction
    );

    if let Some(brief) = identity_brief {
        instruction.push_str(&format!("\n\nIDENTITY LOCK: {}", brief));
    }

    if aspect.is_vertical() {
        instruction.push_str(&format!("\n\n{}", SAFE_ZONE_DIRECTIVE));
    }

    instruction
}
