use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    video::{default_strategies, EncoderStrategy, FitSpec},
};

/// Main configuration, loaded once at startup and passed to the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Background clip source and output resolution
    pub video: VideoConfig,

    /// Where the fitted clip is written
    pub output: OutputConfig,

    /// External tools and the ordered encoder fallback list
    pub encoding: EncodingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.output.validate()?;
        self.encoding.validate()?;
        Ok(())
    }

    /// Resolve the fitting request for a narration of `duration` seconds
    pub fn fit_spec(&self, duration: f64) -> Result<FitSpec> {
        FitSpec::new(duration, self.video.target_width, self.video.target_height)
    }

    /// Default location of the fitted background clip
    pub fn output_path(&self) -> PathBuf {
        self.output.folder.join(&self.output.file_name)
    }
}

/// Background video configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Folder scanned for background clips
    pub background_folder: PathBuf,

    /// Output width in pixels
    pub target_width: u32,

    /// Output height in pixels
    pub target_height: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            background_folder: PathBuf::from("assets/backgrounds"),
            target_width: 1080,
            target_height: 1920,
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.target_resolution".to_string(),
                value: format!("{}x{}", self.target_width, self.target_height)
            }.into());
        }

        Ok(())
    }
}

/// Output location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub folder: PathBuf,
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("output"),
            file_name: "processed_background.mp4".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.file_name".to_string(),
                value: self.file_name.clone()
            }.into());
        }

        Ok(())
    }
}

/// Encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// ffmpeg executable name or path
    pub ffmpeg: String,

    /// ffprobe executable name or path
    pub ffprobe: String,

    /// Strategies in the order they are attempted
    pub strategies: Vec<EncoderStrategy>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            strategies: default_strategies(),
        }
    }
}

impl EncodingConfig {
    fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "encoding.strategies".to_string(),
                value: "[]".to_string()
            }.into());
        }

        if let Some(strategy) = self.strategies.iter().find(|s| s.label.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "encoding.strategies.label".to_string(),
                value: format!("{:?}", strategy.codec)
            }.into());
        }

        Ok(())
    }
}
