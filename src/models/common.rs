use serde::{Deserialize, Serialize};

/// A transport-ready image: base64-encoded bytes plus a concrete MIME type.
///
/// Instances are immutable once constructed; transformations produce new
/// assets rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Base64-encoded image bytes.
    pub data: String,
    /// Concrete MIME type (e.g. "image/jpeg"), never inferred downstream.
    pub mime_type: String,
}

impl ImageAsset {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// One ordered segment of a generation payload.
///
/// Role strings on image parts ("SUBJECT SOURCE", "BRAND LOGO", ...) are
/// semantic labels consumed by the remote model's instruction following,
/// not validated structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    Image { asset: ImageAsset, role: String },
}

/// An image asset together with the semantic role it plays in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledAsset {
    pub asset: ImageAsset,
    pub role: String,
}

impl LabeledAsset {
    pub fn new(asset: ImageAsset, role: impl Into<String>) -> Self {
        Self {
            asset,
            role: role.into(),
        }
    }
}

/// Target aspect ratio of a produced image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9, the standard widescreen thumbnail.
    Landscape,
    /// 1:1, square social post.
    Square,
    /// 9:16, vertical short-form / story format.
    Vertical,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::Vertical => "9:16",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "16:9" => Some(AspectRatio::Landscape),
            "1:1" => Some(AspectRatio::Square),
            "9:16" => Some(AspectRatio::Vertical),
            _ => None,
        }
    }

    /// Vertical/social formats reserve safe zones for platform UI overlays.
    pub fn is_vertical(&self) -> bool {
        matches!(self, AspectRatio::Vertical)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub category: ModelCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Text,
    Vision,
    Image,
}
