// Lists background clips with their probed size and the cover crop for a target frame

use std::path::PathBuf;

use clap::Parser;

use narrated_reel::{
    video::{compute_cover_crop, discover_candidates, FfmpegBackend, MediaBackend},
    Config,
};

#[derive(Parser)]
#[command(name = "inspect_backgrounds", about = "Show cover crops for every background clip")]
struct Args {
    /// Directory containing background clips (defaults to the configured folder)
    directory: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let directory = args.directory.unwrap_or_else(|| config.video.background_folder.clone());
    let width = args.width.unwrap_or(config.video.target_width);
    let height = args.height.unwrap_or(config.video.target_height);

    let backend = FfmpegBackend::new(
        config.encoding.ffmpeg.as_str(),
        config.encoding.ffprobe.as_str(),
    );
    let clips = discover_candidates(&directory)?;

    println!(
        "🎞  {} clip(s) in {} (target {}x{})",
        clips.len(),
        directory.display(),
        width,
        height
    );

    for clip in &clips {
        match backend.probe(clip.path()) {
            Ok(metadata) => {
                let crop = compute_cover_crop(metadata.width, metadata.height, width, height)
                    .map(|rect| rect.to_string())
                    .unwrap_or_else(|e| format!("no crop: {}", e));
                println!(
                    "   {:<32} {:>8.2}s  {}x{}  {:<6}  crop {}",
                    clip.name(),
                    metadata.duration,
                    metadata.width,
                    metadata.height,
                    clip.format().extension(),
                    crop
                );
            }
            Err(e) => println!("   {:<32} ⚠️  {}", clip.name(), e),
        }
    }

    Ok(())
}
