use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AttemptFailure, InvalidArgumentError, Result};

/// Container formats accepted as background clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerFormat {
    Mp4,
    Avi,
    Mov,
    Webm,
}

impl ContainerFormat {
    /// All accepted formats, in discovery order
    pub const ALL: [ContainerFormat; 4] = [
        ContainerFormat::Mp4,
        ContainerFormat::Avi,
        ContainerFormat::Mov,
        ContainerFormat::Webm,
    ];

    /// Infer the container from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "mp4" => Some(Self::Mp4),
            "avi" => Some(Self::Avi),
            "mov" => Some(Self::Mov),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Webm => "webm",
        }
    }
}

/// A discoverable background clip on disk
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRef {
    path: PathBuf,
    format: ContainerFormat,
}

impl ClipRef {
    /// Build a reference if the path carries an accepted extension
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Option<Self> {
        let path = path.into();
        let format = ContainerFormat::from_extension(path.extension()?.to_str()?)?;
        Some(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    /// File name for log lines
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Target duration and resolution for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSpec {
    duration: f64,
    width: u32,
    height: u32,
}

impl FitSpec {
    /// Validate and build a request. Nothing is clamped.
    pub fn new(duration: f64, width: u32, height: u32) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(InvalidArgumentError::NonPositiveDuration { value: duration }.into());
        }
        if width == 0 || height == 0 {
            return Err(InvalidArgumentError::NonPositiveDimensions { width, height }.into());
        }
        Ok(Self { duration, width, height })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Section of the (possibly looped) source that becomes the output
///
/// `repeats` counts extra full plays of the source appended after the first
/// one. It is zero unless the source is shorter than the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
    pub repeats: u32,
}

impl TimeWindow {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_looped(&self) -> bool {
        self.repeats > 0
    }
}

/// Crop window in source pixel coordinates, `x2`/`y2` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width() as f64 / self.height() as f64
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {}) [{}x{}]",
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            self.width(),
            self.height()
        )
    }
}

/// Probed properties of a video file
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
    pub codec: Option<String>,
}

/// The encoded background, ready for the final composition step
#[derive(Debug, Clone)]
pub struct FittedClip {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration: f64,

    /// Label of the encoder strategy that produced the file
    pub strategy: String,

    /// Strategies that failed before the successful one
    pub failed_attempts: Vec<AttemptFailure>,
}
