//! External document converter.
//!
//! The pipeline only needs "Word document in, LaTeX text out"; [`Pandoc`] is
//! the production implementation and tests substitute their own.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::profile::schema::ConverterSection;

/// Errors that abort a conversion attempt
#[derive(Debug)]
pub enum ConvertError {
    /// The source document does not exist
    SourceMissing(PathBuf),
    /// The converter executable could not be found
    ConverterMissing { program: String },
    /// The converter ran and exited unsuccessfully
    ConverterFailed { status: ExitStatus, stderr: String },
    /// Any other failure to run the converter
    Io(io::Error),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::SourceMissing(path) => {
                write!(f, "Word file not found: {}", path.display())
            }
            ConvertError::ConverterMissing { program } => write!(
                f,
                "'{}' not found. Please install Pandoc: https://pandoc.org/installing.html",
                program
            ),
            ConvertError::ConverterFailed { status, stderr } => {
                write!(f, "Pandoc conversion failed ({}): {}", status, stderr)
            }
            ConvertError::Io(e) => write!(f, "Failed to run converter: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Turns a binary document into markup text
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, source: &Path) -> Result<String, ConvertError>;
}

/// Runs `pandoc <source> -f <from> -t <to> <args..>` and captures stdout
#[derive(Debug, Clone)]
pub struct Pandoc {
    program: String,
    from: String,
    to: String,
    args: Vec<String>,
}

impl Pandoc {
    pub fn new(settings: &ConverterSection) -> Self {
        Self {
            program: settings.program.clone(),
            from: settings.from.clone(),
            to: settings.to.clone(),
            args: settings.args.clone(),
        }
    }

    /// Use a different executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, source: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(source)
            .arg("-f")
            .arg(&self.from)
            .arg("-t")
            .arg(&self.to)
            .args(&self.args);
        cmd
    }
}

impl DocumentConverter for Pandoc {
    fn convert(&self, source: &Path) -> Result<String, ConvertError> {
        log::info!(
            "Converting {} to {}...",
            source.file_name().unwrap_or(source.as_os_str()).to_string_lossy(),
            self.to
        );

        let output = self.command(source).output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConvertError::ConverterMissing {
                program: self.program.clone(),
            },
            _ => ConvertError::Io(e),
        })?;

        if !output.status.success() {
            return Err(ConvertError::ConverterFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        log::debug!("Converter produced {} bytes", output.stdout.len());

        // Undecodable bytes are replaced; CRLF output is folded to LF so the
        // line-oriented rewrites see the same text on every platform
        Ok(String::from_utf8_lossy(&output.stdout).replace("\r\n", "\n"))
    }
}
