use std::path::Path;

use rand::Rng;
use tracing::{error, info};

use crate::{
    config::Config,
    error::{InvalidArgumentError, Result},
    video::{
        compute_cover_crop, encode, normalize, select_candidate, ClipHandle, EncoderStrategy,
        FfmpegBackend, FitSpec, FittedClip, MediaBackend,
    },
};

/// Fits one random background clip to a narration's length and the output frame
///
/// The pipeline runs strictly in order:
/// 1. Discovery & selection - pick a clip from the background folder
/// 2. Duration reconciliation - loop or trim to the target duration
/// 3. Cover crop - centered crop to the target aspect
/// 4. Normalize - scale to the target size, drop audio
/// 5. Encode - ordered strategy fallback into a single output file
pub struct BackgroundPipeline<B: MediaBackend = FfmpegBackend> {
    backend: B,
    strategies: Vec<EncoderStrategy>,
}

impl BackgroundPipeline<FfmpegBackend> {
    /// Pipeline using the configured ffmpeg tools and strategy list
    pub fn from_config(config: &Config) -> Self {
        let backend = FfmpegBackend::new(
            config.encoding.ffmpeg.as_str(),
            config.encoding.ffprobe.as_str(),
        );
        Self::new(backend, config.encoding.strategies.clone())
    }
}

impl<B: MediaBackend> BackgroundPipeline<B> {
    pub fn new(backend: B, strategies: Vec<EncoderStrategy>) -> Self {
        Self { backend, strategies }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn strategies(&self) -> &[EncoderStrategy] {
        &self.strategies
    }

    /// Produce the fitted background clip at `output`
    ///
    /// Either one verified file exists at `output` afterwards or an error
    /// is returned and nothing was written there.
    pub fn fit<R: Rng + ?Sized>(
        &self,
        source_dir: &Path,
        spec: &FitSpec,
        output: &Path,
        rng: &mut R,
    ) -> Result<FittedClip> {
        self.run(source_dir, spec, output, rng).map_err(|e| {
            error!("An error occurred while processing the background video: {}", e);
            e
        })
    }

    fn run<R: Rng + ?Sized>(
        &self,
        source_dir: &Path,
        spec: &FitSpec,
        output: &Path,
        rng: &mut R,
    ) -> Result<FittedClip> {
        if self.strategies.is_empty() {
            return Err(InvalidArgumentError::NoStrategies.into());
        }

        let clip = select_candidate(source_dir, rng)?;

        // Dropped on every return below, closing the source
        let handle = ClipHandle::open(clip, &self.backend)?;

        let window = handle.reconcile(spec.duration(), rng)?;

        let rect =
            compute_cover_crop(handle.width(), handle.height(), spec.width(), spec.height())?;
        info!(
            "Cover crop for {}x{} -> {}x{}: {}",
            handle.width(),
            handle.height(),
            spec.width(),
            spec.height(),
            rect
        );

        let frames = handle.frames(window).crop(rect);
        let silent = normalize(frames, spec.width(), spec.height());

        info!("Saving processed video to: {}", output.display());
        let outcome = encode(&silent, output, &self.strategies, &self.backend)?;

        info!("Background video processed successfully: {}", outcome.path.display());
        Ok(FittedClip {
            path: outcome.path,
            width: spec.width(),
            height: spec.height(),
            duration: spec.duration(),
            strategy: outcome.strategy.label,
            failed_attempts: outcome.failed_attempts,
        })
    }
}
