//! Chapter File Writer
//!
//! Writes each registered chapter to its own file, keeping one backup of
//! the previous contents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::split::ChapterSplit;
use crate::profile::ChapterDef;

/// Format of the timestamp in the header comment
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a write pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
    /// Chapter numbers with no registry entry
    pub skipped: Vec<usize>,
}

/// Writes chapters into an output directory
#[derive(Debug, Clone)]
pub struct ChapterWriter {
    output_dir: PathBuf,
    document_title: String,
}

impl ChapterWriter {
    pub fn new(output_dir: impl Into<PathBuf>, document_title: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            document_title: document_title.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Header comment placed at the top of every chapter file
    pub fn header(&self, chapter: &ChapterDef, generated_at: &str) -> String {
        format!(
            "% {} -- Chapter {}: {}\n%\n% {}\n% Auto-generated from Word document - {}\n\n",
            chapter.file, chapter.number, chapter.title, self.document_title, generated_at
        )
    }

    /// Write every chapter present in both the split and the registry
    pub fn write_all(
        &self,
        split: &ChapterSplit,
        registry: &[ChapterDef],
        generated_at: &str,
    ) -> Result<WriteReport> {
        let mut report = WriteReport::default();

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        for (&number, content) in &split.chapters {
            let Some(chapter) = registry.iter().find(|c| c.number == number) else {
                log::warn!("Chapter {} not in configuration, skipping.", number);
                report.skipped.push(number);
                continue;
            };

            let output_file = self.output_dir.join(&chapter.file);

            if output_file.exists() {
                let backup = backup_path(&output_file);
                fs::copy(&output_file, &backup).with_context(|| {
                    format!("Failed to back up {} to {}", output_file.display(), backup.display())
                })?;
                log::debug!("Backed up {}", backup.display());
                report.backups.push(backup);
            }

            let full_content = format!("{}{}", self.header(chapter, generated_at), content);
            fs::write(&output_file, full_content)
                .with_context(|| format!("Failed to write {}", output_file.display()))?;

            log::info!("Saved {}", chapter.file);
            report.written.push(output_file);
        }

        Ok(report)
    }
}

/// `chapter1.tex` -> `chapter1.tex.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
