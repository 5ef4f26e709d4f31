//! GenerateContent wire types. The response shape
//! (`candidates[0].content.parts[*].inlineData.data`) is a collaborator
//! contract with the provider and is preserved field-for-field.

use serde::{Deserialize, Serialize};

use crate::models::{ImageAsset, RequestPart};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub model: String,
    pub contents: RequestContents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContents {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

impl GenerateContentRequest {
    pub fn new(model: impl Into<String>, parts: Vec<GeminiPart>) -> Self {
        Self {
            model: model.into(),
            contents: RequestContents { parts },
            config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Flatten domain parts into wire parts. A roled image becomes its text
/// label followed by the inline image data, so the model reads the role as
/// an instruction.
pub fn to_wire_parts(parts: &[RequestPart]) -> Vec<GeminiPart> {
    let mut wire = Vec::with_capacity(parts.len() * 2);
    for part in parts {
        match part {
            RequestPart::Text(text) => wire.push(GeminiPart::Text { text: text.clone() }),
            RequestPart::Image { asset, role } => {
                wire.push(GeminiPart::Text {
                    text: format!("{}:", role),
                });
                wire.push(GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: asset.mime_type.clone(),
                        data: asset.data.clone(),
                    },
                });
            }
        }
    }
    wire
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// Response parts keep every field optional so unknown part kinds don't
/// fail the whole deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<GeminiInlineData>,
}

impl GenerateContentResponse {
    /// First text segment of the primary candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }

    /// First inline image of the primary candidate.
    pub fn first_image(&self) -> Option<ImageAsset> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| ImageAsset::new(d.data.clone(), d.mime_type.clone()))
    }
}
