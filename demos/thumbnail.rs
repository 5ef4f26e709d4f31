use std::env;
use std::sync::Arc;

use pixelforge::{
    AspectRatio, BrandProfile, ConsoleSink, ForgeConfig, GeminiRouter, ImageAsset, ProviderConfig,
    Reporter, ThumbnailPipeline, ThumbnailRequest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    pixelforge::logger::init()?;

    let api_key = env::var("GEMINI_API_KEY")?;
    let config = ForgeConfig::new().with_provider(ProviderConfig::new().with_api_key(api_key));

    let reporter = Reporter::new(Arc::new(ConsoleSink));
    let router = Arc::new(GeminiRouter::new(config, reporter.clone()));
    let pipeline = ThumbnailPipeline::new(router, reporter);

    // Optional subject photo: pass a path to a JPEG as the first argument.
    let subject_image = match env::args().nth(1) {
        Some(path) => {
            let bytes = std::fs::read(&path)?;
            use base64::{engine::general_purpose::STANDARD, Engine as _};
            Some(ImageAsset::new(STANDARD.encode(bytes), "image/jpeg"))
        }
        None => None,
    };

    let request = ThumbnailRequest {
        category: "Cooking".to_string(),
        title: "The 10-minute ramen that beats restaurants".to_string(),
        aspect: AspectRatio::Vertical,
        subject_image,
        extra_assets: vec![],
        brand: Some(BrandProfile {
            display_name: "Midnight Kitchen".to_string(),
            tone_of_voice: Some("Playful".to_string()),
            color_primary: "#1B1B2F".to_string(),
            color_accent: "#E94560".to_string(),
            heading_font: None,
        }),
    };

    let result = pipeline.produce(&request).await?;
    println!(
        "rendered {} ({} base64 chars)",
        result.mime_type,
        result.image_data.len()
    );

    Ok(())
}
