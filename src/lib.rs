//! # Narrated-Reel
//!
//! Fit a background clip to a narrated short: pick a random clip, loop or
//! trim it to the narration length, cover-crop it to the output frame and
//! encode it through an ordered list of encoder fallbacks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use narrated_reel::{BackgroundPipeline, Config};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let pipeline = BackgroundPipeline::from_config(&config);
//!
//! let spec = config.fit_spec(42.0)?;
//! let fitted = pipeline.fit(
//!     &config.video.background_folder,
//!     &spec,
//!     Path::new("output/processed_background.mp4"),
//!     &mut rand::thread_rng(),
//! )?;
//! println!("{} via {}", fitted.path.display(), fitted.strategy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - clip discovery, duration reconciliation, cover crop, encoding
//! - [`pipeline`] - the end-to-end fitting pipeline
//! - [`audio`] - narration duration measurement
//! - [`config`] - configuration management
//!
//! ## Custom media backends
//!
//! The pipeline talks to decoders and encoders through the
//! [`MediaBackend`](video::MediaBackend) trait. [`FfmpegBackend`](video::FfmpegBackend)
//! drives the `ffmpeg`/`ffprobe` executables; other implementations can be
//! plugged in with [`BackgroundPipeline::new`].

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    audio::NarrationProbe,
    config::Config,
    error::{ReelError, Result},
    pipeline::BackgroundPipeline,
    video::{FitSpec, FittedClip},
};
