use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use crate::error::{AudioError, Result};

/// Measures how long a narration track plays
pub struct NarrationProbe;

impl NarrationProbe {
    /// Duration of a narration file in seconds
    pub async fn duration<P: AsRef<Path>>(path: P) -> Result<f64> {
        let path = path.as_ref().to_path_buf();
        let extension = Self::detect_format(&path).unwrap_or_default();

        let duration = match extension.as_str() {
            "wav" => tokio::task::spawn_blocking(move || Self::wav_duration(&path)).await,
            "mp3" | "flac" | "ogg" | "m4a" | "aac" => {
                tokio::task::spawn_blocking(move || Self::symphonia_duration(&path)).await
            }
            _ => return Err(AudioError::UnsupportedFormat { format: extension.clone() }.into()),
        }
        .map_err(|e| AudioError::InvalidParameters {
            details: format!("narration probe task failed: {}", e),
        })??;

        info!("Narration duration: {:.3}s", duration);
        Ok(duration)
    }

    /// WAV via hound: the header gives the frame count directly
    fn wav_duration(path: &Path) -> Result<f64> {
        let reader = hound::WavReader::open(path)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string()
            })?;

        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(AudioError::InvalidParameters {
                details: "WAV sample rate is zero".to_string()
            }.into());
        }

        Ok(reader.duration() as f64 / spec.sample_rate as f64)
    }

    /// Compressed formats via symphonia
    fn symphonia_duration(path: &Path) -> Result<f64> {
        let load_failed = || AudioError::LoadFailed {
            path: path.display().to_string()
        };

        let file = File::open(path).map_err(|_| load_failed())?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|_| load_failed())?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(load_failed)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let sample_rate = codec_params.sample_rate
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No sample rate found".to_string()
            })?;

        // Containers that record the frame count answer without decoding
        if let Some(frames) = codec_params.n_frames {
            return Ok(frames as f64 / sample_rate as f64);
        }

        debug!("No frame count in {}, decoding to measure", path.display());
        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|_| load_failed())?;

        let mut frames: u64 = 0;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => frames += decoded.frames() as u64,
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(_) => break,
            }
        }

        Ok(frames as f64 / sample_rate as f64)
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "wav" | "mp3" | "flac" | "ogg" | "m4a" | "aac"
        )
    }
}
