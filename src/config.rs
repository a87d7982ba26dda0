//! Configuration management for the converter.
//!
//! Handles:
//! - Command-line argument parsing
//! - Run mode selection (once vs. watch)
//! - Overrides applied on top of the loaded profile

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the converter
#[derive(Debug, Parser)]
#[command(name = "docx2chapters")]
#[command(about = "Convert a Word document into LaTeX chapter files and keep them in sync")]
#[command(version)]
pub struct Args {
    /// Convert once and exit instead of watching
    #[arg(long, help = "Convert once and exit")]
    pub once: bool,

    /// Source Word document
    #[arg(long, help = "Word document to convert (overrides the profile)")]
    pub source: Option<PathBuf>,

    /// Directory receiving the chapter files
    #[arg(long, help = "Directory for generated chapter files (overrides the profile)")]
    pub output_dir: Option<PathBuf>,

    /// Profile file with acronyms, heading titles and the chapter registry
    #[arg(long, help = "Profile TOML file")]
    pub profile: Option<PathBuf>,

    /// Converter executable
    #[arg(long, help = "Pandoc executable to invoke (overrides the profile)")]
    pub pandoc: Option<String>,

    /// Log level for the converter
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Run options taken from the command line. Paths left unset here come from
/// the profile.
#[derive(Debug, Clone)]
pub struct Config {
    /// Convert a single time and exit
    pub once: bool,
    /// Source document set on the command line
    pub source: Option<PathBuf>,
    /// Output directory set on the command line
    pub output_dir: Option<PathBuf>,
    /// Explicit profile path
    pub profile_path: Option<PathBuf>,
    /// Converter program set on the command line
    pub pandoc: Option<String>,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Parse the process arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Check parsed arguments and turn them into run options
    pub fn from_args(args: Args) -> Result<Self> {
        if let Some(program) = &args.pandoc {
            if program.trim().is_empty() {
                bail!("--pandoc needs a program name or path");
            }
        }

        Ok(Config {
            once: args.once,
            source: args.source,
            output_dir: args.output_dir,
            profile_path: args.profile,
            pandoc: args.pandoc,
            log_level: args.log_level,
        })
    }
}
