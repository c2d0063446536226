use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, VideoError};
use crate::video::encoder::{EncoderStrategy, ENCODER_THREADS, OUTPUT_FPS};
use crate::video::handle::SilentFrameStream;
use crate::video::types::VideoMetadata;

/// Media operations the fitting pipeline needs from a decoder/encoder
pub trait MediaBackend {
    /// Read duration and frame size of a video file
    fn probe(&self, path: &Path) -> Result<VideoMetadata>;

    /// Encode `stream` to `output` with one encoder strategy
    ///
    /// Implementations must write a silent file at `OUTPUT_FPS` frames per
    /// second with exactly the stream's width and height.
    fn render(
        &self,
        stream: &SilentFrameStream<'_>,
        strategy: &EncoderStrategy,
        output: &Path,
    ) -> Result<()>;
}

/// Backend driving the external `ffmpeg` and `ffprobe` executables
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegBackend {
    pub fn new<S: Into<String>>(ffmpeg: S, ffprobe: S) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn check_available(&self) -> bool {
        [&self.ffmpeg, &self.ffprobe].iter().all(|tool| {
            Command::new(tool.as_str())
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false)
        })
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaBackend for FfmpegBackend {
    fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,duration,r_frame_rate,codec_name:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(VideoError::ProbeFailed {
                path: path.display().to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        parse_probe_output(path, &String::from_utf8_lossy(&output.stdout))
    }

    fn render(
        &self,
        stream: &SilentFrameStream<'_>,
        strategy: &EncoderStrategy,
        output: &Path,
    ) -> Result<()> {
        let args = render_args(stream, strategy, output);
        debug!("{} {}", self.ffmpeg, args.join(" "));

        let result = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VideoError::EncodingFailed {
                reason: format!("ffmpeg exited with {}: {}", result.status, stderr.trim()),
            }
            .into());
        }

        Ok(())
    }
}

/// Build the ffmpeg argument list for one encode attempt
pub fn render_args(
    stream: &SilentFrameStream<'_>,
    strategy: &EncoderStrategy,
    output: &Path,
) -> Vec<String> {
    let window = stream.window();
    let mut args: Vec<String> = ["-y", "-hide_banner", "-loglevel", "error"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    if window.is_looped() {
        args.extend(["-stream_loop".to_string(), window.repeats.to_string()]);
    } else if window.start > 0.0 {
        args.extend(["-ss".to_string(), format!("{:.6}", window.start)]);
    }

    args.extend(["-i".to_string(), stream.source_path().display().to_string()]);
    args.extend(["-t".to_string(), format!("{:.6}", window.length())]);

    let mut filters = Vec::new();
    if let Some(rect) = stream.crop() {
        filters.push(format!("crop={}:{}:{}:{}", rect.width(), rect.height(), rect.x1, rect.y1));
    }
    filters.push(format!("scale={}:{}", stream.width(), stream.height()));
    filters.push("setsar=1".to_string());
    args.extend(["-vf".to_string(), filters.join(",")]);

    args.push("-an".to_string());
    args.extend(["-r".to_string(), OUTPUT_FPS.to_string()]);
    args.extend(["-threads".to_string(), ENCODER_THREADS.to_string()]);
    // 4:2:0 chroma needs even dimensions; odd sizes keep the encoder's own format
    if stream.width() % 2 == 0 && stream.height() % 2 == 0 {
        args.extend(["-pix_fmt".to_string(), "yuv420p".to_string()]);
    }

    if let Some(codec) = &strategy.codec {
        args.extend(["-c:v".to_string(), codec.clone()]);
    }
    args.extend(strategy.options.iter().cloned());

    args.push(output.display().to_string());
    args
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    r_frame_rate: Option<String>,
    codec_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -of json` output for the first video stream
pub fn parse_probe_output(path: &Path, json: &str) -> Result<VideoMetadata> {
    let probe_failed = |reason: String| VideoError::ProbeFailed {
        path: path.display().to_string(),
        reason,
    };

    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| probe_failed(e.to_string()))?;
    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| probe_failed("no video stream".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(probe_failed("missing frame size".to_string()).into()),
    };

    let duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| stream.duration.as_deref().and_then(|d| d.parse::<f64>().ok()))
        .ok_or_else(|| probe_failed("missing duration".to_string()))?;

    Ok(VideoMetadata {
        duration,
        width,
        height,
        fps: stream.r_frame_rate.as_deref().and_then(parse_frame_rate),
        codec: stream.codec_name.clone(),
    })
}

/// Parse ffprobe rates like `30000/1001` or `25`
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => rate.trim().parse().ok(),
    }
}
