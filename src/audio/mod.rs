//! # Narration Audio Module
//!
//! Measures the synthesized narration so the background clip can be fitted
//! to it. Speech synthesis itself happens elsewhere; this module only reads
//! the finished audio file.
//!
//! ```rust,no_run
//! use narrated_reel::audio::NarrationProbe;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let seconds = NarrationProbe::duration("output/narration.wav").await?;
//! println!("Narration runs {:.1}s", seconds);
//! # Ok(())
//! # }
//! ```

pub mod narration;

pub use narration::NarrationProbe;
