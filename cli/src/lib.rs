use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deck_core::{build_deck, loader, Config};

#[derive(Parser)]
#[command(name = "deck")]
#[command(about = "Generate PowerPoint decks from JSON slide definitions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a deck from a slide definition file
    Build(BuildArgs),
    /// Validate a slide definition file without writing a deck
    Check {
        /// Path to the slide JSON file
        input: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
pub struct BuildArgs {
    /// Path to the slide JSON file (default: slides.json)
    pub input: Option<PathBuf>,

    /// Output name stem; the deck is written as <stem>_<timestamp>.pptx
    #[arg(long)]
    pub output_base: Option<String>,

    /// Directory for generated image files
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Credential file holding the API key on its last line
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Skip image generation and render placeholders only
    #[arg(long)]
    pub no_images: bool,

    /// Override the image model (e.g. imagen-4.0-fast-generate-001)
    #[arg(long)]
    pub model: Option<String>,

    /// Override the image API origin
    #[arg(long)]
    pub base_url: Option<String>,

    /// Omit the caption under generated images
    #[arg(long)]
    pub no_caption: bool,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Some(Commands::Build(args)) => build(args).await,
        Some(Commands::Check { input }) => check(input).await,
        None => build(BuildArgs::default()).await,
    }
}

async fn build(args: BuildArgs) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(output_base) = args.output_base {
        config.output_base = output_base;
    }
    if let Some(images_dir) = args.images_dir {
        config.images_dir = images_dir;
    }
    if let Some(env_file) = args.env_file {
        config.env_file = env_file;
    }
    if let Some(model) = args.model {
        config.model = Some(model);
    }
    if let Some(base_url) = args.base_url {
        config.base_url = Some(base_url);
    }
    if args.no_images {
        config.generate_images = false;
    }
    if args.no_caption {
        config.caption = false;
    }

    let mode = config.image_mode();
    if config.generate_images && !mode.is_enabled() {
        println!("⚠️  No API key found. Will create placeholders instead.");
    }

    let report = build_deck(&config, mode).await?;
    if report.failed > 0 {
        println!("⚠️  {} image(s) fell back to placeholders", report.failed);
    }
    Ok(())
}

async fn check(input: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| PathBuf::from("slides.json"));
    let raw = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("cannot read {}", input.display()))?;
    let slides = loader::parse_slides(&raw)?;

    println!("✅ {}: {} slides", input.display(), slides.len());
    for (i, record) in slides.iter().enumerate() {
        let marker = if record.has_image_prompt() { "🖼" } else { " " };
        println!("  {}. {} {marker}", i + 1, record.display_title());
    }
    Ok(())
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
