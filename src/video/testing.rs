//! In-memory media backend and log capture for unit tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::error::{Result, VideoError};
use crate::video::backend::MediaBackend;
use crate::video::encoder::{EncoderStrategy, OUTPUT_FPS};
use crate::video::handle::SilentFrameStream;
use crate::video::types::{CropRect, TimeWindow, VideoMetadata};

/// What the fake backend was asked to render
#[derive(Debug, Clone)]
pub struct RenderRecord {
    pub label: String,
    pub window: TimeWindow,
    pub crop: Option<CropRect>,
    pub width: u32,
    pub height: u32,
}

/// Reports every source with the same metadata and "encodes" by writing a
/// placeholder file whose probed metadata matches the requested stream.
pub struct FakeBackend {
    source: VideoMetadata,
    failing: HashSet<String>,
    misreporting: HashSet<String>,
    outputs: RefCell<HashMap<PathBuf, VideoMetadata>>,
    renders: RefCell<Vec<RenderRecord>>,
}

impl FakeBackend {
    pub fn new(duration: f64, width: u32, height: u32) -> Self {
        Self {
            source: VideoMetadata {
                duration,
                width,
                height,
                fps: Some(30.0),
                codec: Some("h264".to_string()),
            },
            failing: HashSet::new(),
            misreporting: HashSet::new(),
            outputs: RefCell::new(HashMap::new()),
            renders: RefCell::new(Vec::new()),
        }
    }

    /// Make the strategy with this label fail to encode
    pub fn failing(mut self, label: &str) -> Self {
        self.failing.insert(label.to_string());
        self
    }

    /// Make the strategy with this label write an output of the wrong size
    pub fn misreporting(mut self, label: &str) -> Self {
        self.misreporting.insert(label.to_string());
        self
    }

    pub fn renders(&self) -> Vec<RenderRecord> {
        self.renders.borrow().clone()
    }

    pub fn rendered_labels(&self) -> Vec<String> {
        self.renders.borrow().iter().map(|r| r.label.clone()).collect()
    }
}

impl MediaBackend for FakeBackend {
    fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        if let Some(metadata) = self.outputs.borrow().get(path) {
            return Ok(metadata.clone());
        }
        Ok(self.source.clone())
    }

    fn render(
        &self,
        stream: &SilentFrameStream<'_>,
        strategy: &EncoderStrategy,
        output: &Path,
    ) -> Result<()> {
        self.renders.borrow_mut().push(RenderRecord {
            label: strategy.label.clone(),
            window: stream.window(),
            crop: stream.crop(),
            width: stream.width(),
            height: stream.height(),
        });

        if self.failing.contains(&strategy.label) {
            return Err(VideoError::EncodingFailed {
                reason: format!(
                    "Unknown encoder '{}'",
                    strategy.codec.as_deref().unwrap_or("default")
                ),
            }
            .into());
        }

        std::fs::write(output, b"encoded")?;

        let width = if self.misreporting.contains(&strategy.label) {
            stream.width() / 2
        } else {
            stream.width()
        };
        self.outputs.borrow_mut().insert(
            output.to_path_buf(),
            VideoMetadata {
                duration: stream.duration(),
                width,
                height: stream.height(),
                fps: Some(OUTPUT_FPS as f64),
                codec: strategy.codec.clone(),
            },
        );
        Ok(())
    }
}

/// Shared buffer the fmt layer writes formatted events into
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a debug-level subscriber installed on this thread and
/// return its result with every formatted log line it emitted
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    let lines = String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect();
    (result, lines)
}

/// Lines logged at exactly `level`
pub fn lines_at<'a>(lines: &'a [String], level: Level) -> Vec<&'a str> {
    let tag = level.to_string();
    lines
        .iter()
        .filter(|line| line.trim_start().starts_with(tag.as_str()))
        .map(String::as_str)
        .collect()
}
