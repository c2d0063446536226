use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::task;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use narrated_reel::{BackgroundPipeline, Config, NarrationProbe};

#[derive(Parser)]
#[command(
    name = "narrated-reel",
    version,
    about = "Fit a background clip to a narration for short-form video",
    long_about = "Picks a random clip from the background folder, loops or trims it to the narration length, cover-crops it to the output resolution and encodes it without audio, falling back through the configured encoders."
)]
struct Cli {
    /// Narration audio file whose length sets the target duration (WAV, MP3, FLAC, OGG, M4A, AAC)
    #[arg(short, long, conflicts_with = "duration", required_unless_present = "duration")]
    audio: Option<PathBuf>,

    /// Target duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing background clips (overrides config)
    #[arg(short, long)]
    backgrounds: Option<PathBuf>,

    /// Output video file path (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output width in pixels (overrides config)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (overrides config)
    #[arg(long)]
    height: Option<u32>,

    /// Seed for clip selection and trim placement
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Narrated-Reel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(backgrounds) = cli.backgrounds {
        config.video.background_folder = backgrounds;
    }
    if let Some(width) = cli.width {
        config.video.target_width = width;
    }
    if let Some(height) = cli.height {
        config.video.target_height = height;
    }
    config.validate()?;

    let duration = match (&cli.audio, cli.duration) {
        (Some(audio), _) => {
            info!("Measuring narration: {:?}", audio);
            NarrationProbe::duration(audio).await?
        }
        (None, Some(duration)) => duration,
        (None, None) => anyhow::bail!("either --audio or --duration is required"),
    };

    let spec = config.fit_spec(duration)?;
    let output = cli.output.unwrap_or_else(|| config.output_path());
    let source_dir = config.video.background_folder.clone();

    info!("Backgrounds: {:?}", source_dir);
    info!("Target: {:.3}s at {}x{}", spec.duration(), spec.width(), spec.height());
    info!("Output: {:?}", output);

    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let pipeline = BackgroundPipeline::from_config(&config);
    if !pipeline.backend().check_available() {
        warn!("ffmpeg/ffprobe not found on PATH; encoding will fail");
    }
    let labels: Vec<&str> = pipeline.strategies().iter().map(|s| s.label.as_str()).collect();
    info!("Encoder strategies: {}", labels.join(" -> "));

    let fitted = task::spawn_blocking(move || pipeline.fit(&source_dir, &spec, &output, &mut rng))
        .await
        .context("background fitting task panicked")?
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    for failure in &fitted.failed_attempts {
        info!("Skipped encoder {}", failure);
    }
    info!(
        "Fitted background: {}x{}, {:.3}s via {}",
        fitted.width, fitted.height, fitted.duration, fitted.strategy
    );

    println!("{}", fitted.path.display());
    Ok(())
}
