//! Run orchestration: load slides, resolve per-slide generation outcomes,
//! compose layouts, write the deck.
//!
//! Failures scoped to a single slide are converted to
//! [`GenerationOutcome::Failed`] at that slide's boundary and the run
//! continues; only failures that make the whole run meaningless (bad input
//! shape, unwritable output locations) propagate as [`DeckError`].

use std::path::PathBuf;

use deck_common::SlideRecord;
use deck_imagen::ImagenClient;

use crate::compose::{compose, GenerationOutcome, RenderConfig};
use crate::config::{Config, ImageGenMode};
use crate::error::{DeckError, Result};
use crate::loader;
use crate::pptx::PptxDeck;

/// Summary of one completed run.
#[derive(Debug)]
pub struct BuildReport {
    pub deck_path: PathBuf,
    pub slide_count: usize,
    pub generated: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Build one deck from `config.input`.
///
/// `mode` is resolved once by the caller; the pipeline never re-reads
/// credential state.
pub async fn build_deck(config: &Config, mode: ImageGenMode) -> Result<BuildReport> {
    let raw = tokio::fs::read_to_string(&config.input).await.map_err(|e| {
        DeckError::InvalidInput(format!("cannot read {}: {e}", config.input.display()))
    })?;
    let slides = loader::parse_slides(&raw)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let deck_path = PathBuf::from(format!("{}_{timestamp}.pptx", config.output_base));

    let client = make_client(config, mode);
    if client.is_some() {
        // Fatal when this fails; generated images would have nowhere to go.
        tokio::fs::create_dir_all(&config.images_dir).await?;
    }

    let mut render = RenderConfig::default();
    if !config.caption {
        render.caption = None;
    }

    println!("\n🎨 Creating presentation with {} slides...\n", slides.len());

    let total = slides.len();
    let mut deck = PptxDeck::new();
    let mut report = BuildReport {
        deck_path: deck_path.clone(),
        slide_count: total,
        generated: 0,
        failed: 0,
        skipped: 0,
    };

    for (i, record) in slides.iter().enumerate() {
        let index = i + 1;
        println!(
            "📄 Slide {index}/{total}: {}...",
            truncate(record.display_title(), 50)
        );

        let outcome = resolve_outcome(client.as_ref(), record, index, config, &timestamp).await;
        match outcome {
            GenerationOutcome::Succeeded { .. } => report.generated += 1,
            GenerationOutcome::Failed => report.failed += 1,
            GenerationOutcome::Skipped => report.skipped += 1,
        }

        let plan = compose(record, &render, &outcome);
        deck.add_slide(&plan)?;
        println!("  ✅ Slide {index} completed\n");
    }

    deck.save(&deck_path)?;
    println!("\n✅ Presentation saved to {}", deck_path.display());
    println!("📊 Created {total} slides");

    Ok(report)
}

fn make_client(config: &Config, mode: ImageGenMode) -> Option<ImagenClient> {
    let api_key = match mode {
        ImageGenMode::Enabled { api_key } => api_key,
        ImageGenMode::Disabled => return None,
    };
    let mut client = match ImagenClient::new(api_key) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "cannot build image client, using placeholders");
            return None;
        }
    };
    if let Some(model) = &config.model {
        client = client.with_model(model.clone());
    }
    if let Some(base_url) = &config.base_url {
        client = client.with_base_url(base_url.clone());
    }
    Some(client)
}

/// Decide the image outcome for one slide: at most one provider call, only
/// when generation is enabled and the slide carries a prompt. Every failure
/// on this path degrades to `Failed` for this slide alone.
async fn resolve_outcome(
    client: Option<&ImagenClient>,
    record: &SlideRecord,
    index: usize,
    config: &Config,
    timestamp: &str,
) -> GenerationOutcome {
    let Some(client) = client else {
        return GenerationOutcome::Skipped;
    };
    if !record.has_image_prompt() {
        return GenerationOutcome::Skipped;
    }

    let prompt = &record.image_prompt;
    println!("  🖼  Generating image: {}...", truncate(prompt, 50));

    let bytes = match client.generate(prompt).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("  ❌ Failed to generate image: {e}");
            tracing::warn!(slide = index, error = %e, "image generation failed");
            return GenerationOutcome::Failed;
        }
    };

    let path = config
        .images_dir
        .join(format!("slide_{index}_{timestamp}.png"));
    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        println!("  ❌ Failed to save image: {e}");
        tracing::warn!(slide = index, error = %e, "image write failed");
        return GenerationOutcome::Failed;
    }

    // Read-back check; also yields the pixel size the layout needs.
    match image::image_dimensions(&path) {
        Ok(pixel_size) => {
            println!("  ✅ Image saved to {}", path.display());
            GenerationOutcome::Succeeded { path, pixel_size }
        }
        Err(e) => {
            println!("  ❌ Generated image is unreadable: {e}");
            tracing::warn!(slide = index, error = %e, "image read-back failed");
            GenerationOutcome::Failed
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
