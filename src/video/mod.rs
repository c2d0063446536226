//! # Background Video Module
//!
//! Discovers background clips, reconciles their duration with the narration,
//! computes the cover crop and encodes the fitted result.

pub mod backend;
pub mod discovery;
pub mod encoder;
pub mod geometry;
pub mod handle;
pub mod timing;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{FfmpegBackend, MediaBackend};
pub use discovery::{discover_candidates, select_candidate};
pub use encoder::{
    default_strategies, encode, EncodeOutcome, EncoderStrategy, ENCODER_THREADS, OUTPUT_FPS,
};
pub use geometry::compute_cover_crop;
pub use handle::{normalize, ClipHandle, FrameStream, SilentFrameStream};
pub use timing::reconcile_duration;
pub use types::{ClipRef, ContainerFormat, CropRect, FitSpec, FittedClip, TimeWindow, VideoMetadata};
