use serde::{Deserialize, Serialize};

use super::common::{AspectRatio, ImageAsset, LabeledAsset};

/// Caller-supplied brand kit, injected verbatim into the brand directive.
/// Read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandProfile {
    pub display_name: String,
    pub tone_of_voice: Option<String>,
    pub color_primary: String,
    pub color_accent: String,
    pub heading_font: Option<String>,
}

/// One thumbnail production request. Constructed once per user action and
/// never mutated after submission; a retry re-submits the identical struct.
#[derive(Debug, Clone)]
pub struct ThumbnailRequest {
    /// Content category, e.g. "Gaming" or "Finance".
    pub category: String,
    /// Video title / caption the thumbnail advertises.
    pub title: String,
    pub aspect: AspectRatio,
    /// Identity-bearing reference image of the subject or host, when one
    /// exists. Its absence skips identity extraction entirely.
    pub subject_image: Option<ImageAsset>,
    /// Additional reference images (brand logo, background plate, ...).
    pub extra_assets: Vec<LabeledAsset>,
    pub brand: Option<BrandProfile>,
}

/// One marketing pack production request.
#[derive(Debug, Clone)]
pub struct MarketingPackRequest {
    /// What the campaign is about, in the caller's words.
    pub campaign_brief: String,
    pub category: String,
    /// Hero product shot the pack is built around, when one exists.
    pub product_image: Option<ImageAsset>,
    pub extra_assets: Vec<LabeledAsset>,
    pub brand: Option<BrandProfile>,
}

/// Structured strategy returned by the research stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailStrategy {
    pub headline: String,
    pub color_strategy: String,
    pub composition_rule: String,
    pub vibe: String,
}

impl ThumbnailStrategy {
    /// Fixed strategy substituted when research fails or returns garbage.
    pub fn fallback() -> Self {
        Self {
            headline: "UNBELIEVABLE RESULT".to_string(),
            color_strategy: "High-contrast Yellow and Black".to_string(),
            composition_rule: "Rule of Thirds".to_string(),
            vibe: "Intense".to_string(),
        }
    }
}

/// Structured plan returned by the pack-planning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackPlan {
    pub concept: String,
    pub assets: Vec<PlannedAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAsset {
    pub name: String,
    pub format: String,
    /// Aspect label as planned by the model ("16:9", "1:1", "9:16").
    pub aspect_ratio: String,
    pub instruction: String,
}

impl PackPlan {
    /// Fixed three-asset plan substituted when planning fails.
    pub fn fallback(campaign_brief: &str) -> Self {
        let instruction = format!("Showcase the campaign: {}", campaign_brief);
        Self {
            concept: "Clean, product-forward campaign visuals".to_string(),
            assets: vec![
                PlannedAsset {
                    name: "Wide banner".to_string(),
                    format: "banner".to_string(),
                    aspect_ratio: "16:9".to_string(),
                    instruction: instruction.clone(),
                },
                PlannedAsset {
                    name: "Square post".to_string(),
                    format: "post".to_string(),
                    aspect_ratio: "1:1".to_string(),
                    instruction: instruction.clone(),
                },
                PlannedAsset {
                    name: "Vertical story".to_string(),
                    format: "story".to_string(),
                    aspect_ratio: "9:16".to_string(),
                    instruction,
                },
            ],
        }
    }
}

/// Finished synthetic image handed back to the caller. The pipeline holds
/// no reference after return.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Base64-encoded image bytes.
    pub image_data: String,
    pub mime_type: String,
    /// Model that rendered the image.
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_strategy_is_fixed() {
        let s = ThumbnailStrategy::fallback();
        assert_eq!(s.headline, "UNBELIEVABLE RESULT");
        assert_eq!(s.color_strategy, "High-contrast Yellow and Black");
        assert_eq!(s.composition_rule, "Rule of Thirds");
        assert_eq!(s.vibe, "Intense");
    }

    #[test]
    fn test_strategy_parses_camel_case() {
        let json = r#"{
            "headline": "SECRET WEAPON",
            "colorStrategy": "Electric blue on charcoal",
            "compositionRule": "Center-weighted",
            "vibe": "Mysterious"
        }"#;
        let s: ThumbnailStrategy = serde_json::from_str(json).unwrap();
        assert_eq!(s.color_strategy, "Electric blue on charcoal");
    }

    #[test]
    fn test_fallback_plan_covers_core_formats() {
        let plan = PackPlan::fallback("spring launch");
        assert_eq!(plan.assets.len(), 3);
        let labels: Vec<&str> = plan.assets.iter().map(|a| a.aspect_ratio.as_str()).collect();
        assert_eq!(labels, vec!["16:9", "1:1", "9:16"]);
        assert!(plan.assets[0].instruction.contains("spring launch"));
    }
}
