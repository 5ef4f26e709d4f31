use std::env;
use std::sync::Arc;

use pixelforge::{
    AspectRatio, ConsoleSink, ForgeConfig, GeminiRouter, Reporter, ThumbnailPipeline,
    ThumbnailRequest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    pixelforge::logger::init_with_config(
        pixelforge::logger::LoggerConfig::development()
            .with_level(pixelforge::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking provider environment...");

    match env::var("GEMINI_API_KEY") {
        Ok(key) => {
            log::info!("✅ Provider API key found in environment");
            log::debug!("API key starts with: {}...", &key[..6.min(key.len())]);
        }
        Err(_) => {
            log::warn!("⚠️  No GEMINI_API_KEY set, direct-mode calls will fail");
        }
    }

    let config = ForgeConfig::from_env();
    log::info!("⚙️  Router mode: {:?}", config.mode);

    log::info!("📚 Supported models:");
    for model in GeminiRouter::supported_models() {
        log::info!("  {} - {} ({:?})", model.id, model.name, model.category);
    }

    let reporter = Reporter::new(Arc::new(ConsoleSink));
    let router = Arc::new(GeminiRouter::new(config, reporter.clone()));
    let pipeline = ThumbnailPipeline::new(router, reporter);

    log::info!("🔄 Producing a sample thumbnail...");

    let request = ThumbnailRequest {
        category: "Technology".to_string(),
        title: "I automated my entire home for under $100".to_string(),
        aspect: AspectRatio::Landscape,
        subject_image: None,
        extra_assets: vec![],
        brand: None,
    };

    match pipeline.produce(&request).await {
        Ok(result) => {
            log::info!("✅ Thumbnail produced with {}", result.model);
            log::info!(
                "🖼️  {} bytes of base64 {} data",
                result.image_data.len(),
                result.mime_type
            );
            std::fs::write("thumbnail.b64", &result.image_data)?;
            log::info!("💾 Saved base64 payload to thumbnail.b64");
        }
        Err(e) => {
            log::error!("❌ Thumbnail production failed: {}", e);
            log::warn!("💡 Check your API key and network, then retry");
        }
    }

    Ok(())
}
