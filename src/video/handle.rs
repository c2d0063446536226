use std::fs::File;
use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

use crate::error::Result;
use crate::video::backend::MediaBackend;
use crate::video::timing::reconcile_duration;
use crate::video::types::{ClipRef, CropRect, TimeWindow, VideoMetadata};

/// An opened background clip
///
/// Holds a read handle on the source for as long as frames are being
/// pulled from it. The handle is closed when this value is dropped, so
/// every early return in the pipeline releases it.
#[derive(Debug)]
pub struct ClipHandle {
    clip: ClipRef,
    metadata: VideoMetadata,
    _source: File,
}

impl ClipHandle {
    /// Open and probe a clip. I/O errors from opening the file propagate unchanged.
    pub fn open(clip: ClipRef, backend: &dyn MediaBackend) -> Result<Self> {
        let source = File::open(clip.path())?;
        let metadata = backend.probe(clip.path())?;

        info!(
            "Opened {}: {:.3}s, {}x{}",
            clip.name(),
            metadata.duration,
            metadata.width,
            metadata.height
        );

        Ok(Self {
            clip,
            metadata,
            _source: source,
        })
    }

    pub fn path(&self) -> &Path {
        self.clip.path()
    }

    pub fn duration(&self) -> f64 {
        self.metadata.duration
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    /// Reconcile this clip's duration against the target
    pub fn reconcile<R: Rng + ?Sized>(
        &self,
        target_duration: f64,
        rng: &mut R,
    ) -> Result<TimeWindow> {
        info!(
            "Video duration: {:.3}s, Audio duration: {:.3}s",
            self.duration(),
            target_duration
        );
        let window = reconcile_duration(self.duration(), target_duration, rng)?;
        info!(
            "Trimming video from {:.3}s to {:.3}s{}",
            window.start,
            window.end,
            if window.is_looped() { " (looped)" } else { "" }
        );
        Ok(window)
    }

    /// Frames of this clip over a time window
    pub fn frames(&self, window: TimeWindow) -> FrameStream<'_> {
        FrameStream {
            handle: self,
            window,
            crop: None,
        }
    }
}

impl Drop for ClipHandle {
    fn drop(&mut self) {
        debug!("Released clip handle for {}", self.clip.name());
    }
}

/// Frames drawn from an open clip, still carrying the source audio
#[derive(Debug, Clone, Copy)]
pub struct FrameStream<'a> {
    handle: &'a ClipHandle,
    window: TimeWindow,
    crop: Option<CropRect>,
}

impl<'a> FrameStream<'a> {
    /// Restrict every frame to `rect`
    pub fn crop(self, rect: CropRect) -> Self {
        Self {
            crop: Some(rect),
            ..self
        }
    }
}

/// Frames scaled to the output size with the audio track removed
///
/// Encoders only accept this type, so source audio can never reach
/// the fitted clip.
#[derive(Debug, Clone, Copy)]
pub struct SilentFrameStream<'a> {
    frames: FrameStream<'a>,
    width: u32,
    height: u32,
}

impl<'a> SilentFrameStream<'a> {
    pub fn source_path(&self) -> &'a Path {
        self.frames.handle.path()
    }

    pub fn window(&self) -> TimeWindow {
        self.frames.window
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.frames.crop
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn duration(&self) -> f64 {
        self.frames.window.length()
    }
}

/// Scale frames to exactly `width` x `height` and drop the audio track
pub fn normalize(frames: FrameStream<'_>, width: u32, height: u32) -> SilentFrameStream<'_> {
    SilentFrameStream { frames, width, height }
}
