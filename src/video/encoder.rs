use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::{Builder, NamedTempFile};
use tracing::{error, info, warn};

use crate::error::{
    AttemptFailure, EncodingExhaustedError, InvalidArgumentError, Result, VideoError,
};
use crate::video::backend::MediaBackend;
use crate::video::handle::SilentFrameStream;

/// Output frame rate, identical for every strategy
pub const OUTPUT_FPS: u32 = 30;

/// Encoder worker threads, identical for every strategy
pub const ENCODER_THREADS: u32 = 4;

/// Slack on top of one frame interval when checking the encoded duration
const DURATION_SLACK: f64 = 1e-3;

/// One encoder configuration tried by the fallback loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderStrategy {
    /// Name used in logs and failure reports
    pub label: String,

    /// Codec identifier; `None` lets the backend pick its default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,

    /// Extra encoder-specific arguments
    #[serde(default)]
    pub options: Vec<String>,
}

impl EncoderStrategy {
    pub fn new<S: Into<String>>(label: S, codec: Option<&str>, options: &[&str]) -> Self {
        Self {
            label: label.into(),
            codec: codec.map(str::to_string),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl fmt::Display for EncoderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.codec {
            Some(codec) => write!(f, "{} ({})", self.label, codec),
            None => write!(f, "{} (default codec)", self.label),
        }
    }
}

/// Hardware H.264, then software H.264, then whatever the backend defaults to
pub fn default_strategies() -> Vec<EncoderStrategy> {
    vec![
        EncoderStrategy::new("Intel Quick Sync Video", Some("h264_qsv"), &[]),
        EncoderStrategy::new("libx264 software", Some("libx264"), &["-preset", "faster"]),
        EncoderStrategy::new("default encoder", None, &[]),
    ]
}

/// Result of a successful encode
#[derive(Debug)]
pub struct EncodeOutcome {
    pub path: PathBuf,
    pub strategy: EncoderStrategy,
    pub failed_attempts: Vec<AttemptFailure>,
}

/// Encode `stream` to `output`, trying each strategy in order
///
/// Every attempt writes to its own staging file next to `output`; only a
/// verified attempt is renamed into place. Failed attempts are logged and
/// collected, and the whole call fails only when none succeeds.
pub fn encode(
    stream: &SilentFrameStream<'_>,
    output: &Path,
    strategies: &[EncoderStrategy],
    backend: &dyn MediaBackend,
) -> Result<EncodeOutcome> {
    if strategies.is_empty() {
        return Err(InvalidArgumentError::NoStrategies.into());
    }

    let staging_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&staging_dir)?;

    let mut failures = Vec::new();

    for strategy in strategies {
        info!("Encoding with {}", strategy);

        match attempt(stream, strategy, &staging_dir, output, backend) {
            Ok(staged) => {
                staged.persist(output).map_err(|e| e.error)?;
                info!("Background video written to {} using {}", output.display(), strategy.label);
                return Ok(EncodeOutcome {
                    path: output.to_path_buf(),
                    strategy: strategy.clone(),
                    failed_attempts: failures,
                });
            }
            Err(failure) => {
                warn!("Error with {}: {}. Trying next method.", strategy, failure.reason);
                failures.push(failure);
            }
        }
    }

    error!("All {} encoder strategies failed for {}", failures.len(), output.display());
    Err(EncodingExhaustedError {
        output: output.to_path_buf(),
        failures,
    }
    .into())
}

/// Run one strategy into a fresh staging file and verify what it wrote
///
/// The staging file is deleted when dropped, so a failed attempt leaves
/// nothing behind.
fn attempt(
    stream: &SilentFrameStream<'_>,
    strategy: &EncoderStrategy,
    staging_dir: &Path,
    output: &Path,
    backend: &dyn MediaBackend,
) -> std::result::Result<NamedTempFile, AttemptFailure> {
    let fail = |reason: String| AttemptFailure {
        strategy: strategy.label.clone(),
        reason,
    };

    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| ".mp4".to_string());

    let staged = Builder::new()
        .prefix(".fitting-")
        .suffix(&suffix)
        .tempfile_in(staging_dir)
        .map_err(|e| fail(format!("cannot create staging file: {}", e)))?;

    backend
        .render(stream, strategy, staged.path())
        .map_err(|e| fail(e.to_string()))?;

    verify(stream, staged.path(), backend).map_err(|e| fail(e.to_string()))?;

    Ok(staged)
}

/// Check resolution exactly and duration to within one frame
fn verify(stream: &SilentFrameStream<'_>, path: &Path, backend: &dyn MediaBackend) -> Result<()> {
    let metadata = backend.probe(path)?;

    if metadata.width != stream.width() || metadata.height != stream.height() {
        return Err(VideoError::VerificationFailed {
            reason: format!(
                "expected {}x{}, encoded {}x{}",
                stream.width(),
                stream.height(),
                metadata.width,
                metadata.height
            ),
        }
        .into());
    }

    let tolerance = 1.0 / OUTPUT_FPS as f64 + DURATION_SLACK;
    if (metadata.duration - stream.duration()).abs() > tolerance {
        return Err(VideoError::VerificationFailed {
            reason: format!(
                "expected {:.3}s, encoded {:.3}s",
                stream.duration(),
                metadata.duration
            ),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use crate::video::handle::{normalize, ClipHandle};
    use crate::video::testing::{capture_logs, lines_at, FakeBackend};
    use crate::video::types::{ClipRef, TimeWindow};
    use tempfile::tempdir;
    use tracing::Level;

    fn fixture(dir: &Path, backend: &FakeBackend) -> ClipHandle {
        let path = dir.join("source.mp4");
        std::fs::write(&path, b"fixture").unwrap();
        ClipHandle::open(ClipRef::from_path(&path).unwrap(), backend).unwrap()
    }

    fn leftover_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name != "source.mp4")
            .collect()
    }

    #[test]
    fn test_first_strategy_wins() {
        let temp_dir = tempdir().unwrap();
        let backend = FakeBackend::new(30.0, 1920, 1080);
        let handle = fixture(temp_dir.path(), &backend);
        let stream = normalize(handle.frames(TimeWindow { start: 5.0, end: 15.0, repeats: 0 }), 1080, 1920);
        let output = temp_dir.path().join("out.mp4");

        let outcome = encode(&stream, &output, &default_strategies(), &backend).unwrap();
        assert_eq!(outcome.strategy.codec.as_deref(), Some("h264_qsv"));
        assert!(outcome.failed_attempts.is_empty());
        assert!(output.exists());
        assert_eq!(backend.rendered_labels(), vec!["Intel Quick Sync Video"]);
    }

    #[test]
    fn test_falls_back_to_third_strategy() {
        let temp_dir = tempdir().unwrap();
        let backend = FakeBackend::new(30.0, 1920, 1080)
            .failing("Intel Quick Sync Video")
            .failing("libx264 software");
        let handle = fixture(temp_dir.path(), &backend);
        let stream = normalize(handle.frames(TimeWindow { start: 0.0, end: 10.0, repeats: 0 }), 1080, 1920);
        let output = temp_dir.path().join("out.mp4");

        let (outcome, logs) = capture_logs(|| encode(&stream, &output, &default_strategies(), &backend));
        let outcome = outcome.unwrap();
        assert_eq!(outcome.strategy.label, "default encoder");
        assert_eq!(outcome.strategy.codec, None);
        assert_eq!(outcome.failed_attempts.len(), 2);
        assert_eq!(outcome.failed_attempts[0].strategy, "Intel Quick Sync Video");
        assert_eq!(outcome.failed_attempts[1].strategy, "libx264 software");
        assert_eq!(
            backend.rendered_labels(),
            vec!["Intel Quick Sync Video", "libx264 software", "default encoder"]
        );
        assert_eq!(leftover_files(temp_dir.path()), vec!["out.mp4"]);

        let warnings = lines_at(&logs, Level::WARN);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Intel Quick Sync Video"));
        assert!(warnings[1].contains("libx264 software"));
        assert!(lines_at(&logs, Level::ERROR).is_empty());
    }

    #[test]
    fn test_all_strategies_fail() {
        let temp_dir = tempdir().unwrap();
        let backend = FakeBackend::new(30.0, 1920, 1080)
            .failing("Intel Quick Sync Video")
            .failing("libx264 software")
            .failing("default encoder");
        let handle = fixture(temp_dir.path(), &backend);
        let stream = normalize(handle.frames(TimeWindow { start: 0.0, end: 10.0, repeats: 0 }), 1080, 1920);
        let output = temp_dir.path().join("out.mp4");

        let (result, logs) = capture_logs(|| encode(&stream, &output, &default_strategies(), &backend));
        match result {
            Err(ReelError::EncodingExhausted(err)) => {
                assert_eq!(err.failures.len(), 3);
                assert_eq!(err.output, output);
                let labels: Vec<&str> = err.failures.iter().map(|f| f.strategy.as_str()).collect();
                assert_eq!(labels, vec!["Intel Quick Sync Video", "libx264 software", "default encoder"]);
            }
            other => panic!("Expected EncodingExhausted, got {:?}", other.map(|o| o.path)),
        }

        assert!(!output.exists());
        assert!(leftover_files(temp_dir.path()).is_empty());

        let warnings = lines_at(&logs, Level::WARN);
        assert_eq!(warnings.len(), 3);
        let labels = ["Intel Quick Sync Video", "libx264 software", "default encoder"];
        for (line, label) in warnings.iter().zip(labels) {
            assert!(line.contains(label), "{} should mention {}", line, label);
        }
        let errors = lines_at(&logs, Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("All 3 encoder strategies failed"));
    }

    #[test]
    fn test_wrong_output_size_counts_as_failure() {
        let temp_dir = tempdir().unwrap();
        let backend = FakeBackend::new(30.0, 1920, 1080).misreporting("Intel Quick Sync Video");
        let handle = fixture(temp_dir.path(), &backend);
        let stream = normalize(handle.frames(TimeWindow { start: 0.0, end: 10.0, repeats: 0 }), 1080, 1920);
        let output = temp_dir.path().join("out.mp4");

        let outcome = encode(&stream, &output, &default_strategies(), &backend).unwrap();
        assert_eq!(outcome.strategy.label, "libx264 software");
        assert_eq!(outcome.failed_attempts.len(), 1);
        assert!(outcome.failed_attempts[0].reason.contains("verification"));
    }

    #[test]
    fn test_empty_strategy_list_rejected() {
        let temp_dir = tempdir().unwrap();
        let backend = FakeBackend::new(30.0, 1920, 1080);
        let handle = fixture(temp_dir.path(), &backend);
        let stream = normalize(handle.frames(TimeWindow { start: 0.0, end: 10.0, repeats: 0 }), 1080, 1920);

        let result = encode(&stream, &temp_dir.path().join("out.mp4"), &[], &backend);
        assert!(matches!(
            result,
            Err(ReelError::InvalidArgument(InvalidArgumentError::NoStrategies))
        ));
    }

    #[test]
    fn test_strategy_display() {
        let strategies = default_strategies();
        assert_eq!(strategies[0].to_string(), "Intel Quick Sync Video (h264_qsv)");
        assert_eq!(strategies[2].to_string(), "default encoder (default codec)");
        assert_eq!(strategies[1].options, vec!["-preset", "faster"]);
    }
}
