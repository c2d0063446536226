//! # Background Fitting Pipeline
//!
//! Entry point that ties discovery, reconciliation, cropping and encoding
//! together for one narration.

pub mod engine;

pub use engine::BackgroundPipeline;
