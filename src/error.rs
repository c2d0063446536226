use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the narrated-reel library
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    #[error(transparent)]
    EncodingExhausted(#[from] EncodingExhaustedError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Missing inputs: the background folder or any usable clip in it
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("Background folder does not exist: {path}")]
    MissingDirectory { path: String },

    #[error("No video files found in the background folder: {path}")]
    NoCandidates { path: String },
}

/// Caller contract violations. These are never clamped or coerced.
#[derive(Error, Debug, PartialEq)]
pub enum InvalidArgumentError {
    #[error("target duration must be positive, got {value}")]
    NonPositiveDuration { value: f64 },

    #[error("dimensions must be positive, got {width}x{height}")]
    NonPositiveDimensions { width: u32, height: u32 },

    #[error("cover crop of {source_width}x{source_height} to {target_width}x{target_height} collapses to an empty region")]
    DegenerateCrop {
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
    },

    #[error("at least one encoder strategy is required")]
    NoStrategies,
}

/// One failed encoder attempt, recorded instead of raised
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptFailure {
    pub strategy: String,
    pub reason: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Every encoder strategy failed for one output
#[derive(Error, Debug)]
#[error("all {} encoder strategies failed for {}", .failures.len(), .output.display())]
pub struct EncodingExhaustedError {
    pub output: PathBuf,
    pub failures: Vec<AttemptFailure>,
}

/// Video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to probe video file {path}: {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Output verification failed: {reason}")]
    VerificationFailed { reason: String },
}

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ReelError
pub type Result<T> = std::result::Result<T, ReelError>;

impl ReelError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(NotFoundError::NoCandidates { path }) => {
                format!("No .mp4, .avi, .mov or .webm files in '{}'. Add at least one background clip.", path)
            }
            Self::EncodingExhausted(err) => {
                let attempts: Vec<String> = err.failures.iter().map(|f| f.to_string()).collect();
                format!("{} ({})", err, attempts.join("; "))
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
