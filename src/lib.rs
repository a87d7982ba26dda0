//! docx2chapters
//!
//! Converts a Word document into LaTeX chapter files and keeps them in sync.
//!
//! This library provides:
//! - Converter invocation (pandoc) behind a small trait
//! - Text rewrites: normalization, acronym folding, heading reconstruction
//! - Chapter splitting and file output with single-generation backups
//! - A debounced watch loop that re-runs the pipeline on change

pub mod app;
pub mod chapters;
pub mod config;
pub mod converter;
pub mod pipeline;
pub mod profile;
pub mod transform;
pub mod watch;

// Re-exports for clean public API
pub use config::Config;
pub use converter::{ConvertError, DocumentConverter, Pandoc};
pub use pipeline::{ConversionReport, Pipeline};
pub use profile::{Profile, ProfileLoader};
