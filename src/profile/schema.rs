//! Profile Schema Types
//!
//! Tables that drive the conversion: acronyms, heading titles, the chapter
//! registry, and the converter/watch settings.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Root profile file structure (matches TOML). Every section is optional so a
/// user profile only has to carry what it changes.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileFile {
    pub document: Option<DocumentSection>,
    pub converter: Option<ConverterSection>,
    pub watch: Option<WatchSection>,
    pub headings: Option<HeadingOverlay>,
    pub chapters: Option<Vec<ChapterDef>>,
    pub acronyms: Option<Vec<AcronymDef>>,
}

/// Runtime profile with every section filled in
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub document: DocumentSection,
    pub converter: ConverterSection,
    pub watch: WatchSection,
    pub headings: HeadingSection,
    pub chapters: Vec<ChapterDef>,
    pub acronyms: Vec<AcronymDef>,
}

/// Document metadata and default paths
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentSection {
    /// Title printed in the generated header comment
    pub title: String,
    /// Source Word document
    pub source: Option<PathBuf>,
    /// Directory receiving the chapter files
    pub chapters_dir: Option<PathBuf>,
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            title: "Natural Rubber Latex Thesis".to_string(),
            source: None,
            chapters_dir: Some(PathBuf::from("chapters")),
        }
    }
}

/// External converter invocation settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterSection {
    pub program: String,
    pub from: String,
    pub to: String,
    pub args: Vec<String>,
}

impl Default for ConverterSection {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            from: "docx".to_string(),
            to: "latex".to_string(),
            args: vec!["--wrap=none".to_string()],
        }
    }
}

/// Watch loop timing
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSection {
    /// Minimum gap between two accepted change events
    pub debounce_ms: u64,
    /// Delay before converting, so the writer can finish saving
    pub settle_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: 2000,
            settle_ms: 1000,
        }
    }
}

impl WatchSection {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Bold titles promoted to sectioning commands
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HeadingSection {
    pub sections: Vec<String>,
    pub subsections: Vec<String>,
}

/// `[headings]` as written in a profile file. A list that is left out keeps
/// the one from the profile underneath.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HeadingOverlay {
    pub sections: Option<Vec<String>>,
    pub subsections: Option<Vec<String>>,
}

impl HeadingSection {
    fn overlay(&mut self, file: HeadingOverlay) {
        if let Some(sections) = file.sections {
            self.sections = sections;
        }
        if let Some(subsections) = file.subsections {
            self.subsections = subsections;
        }
    }
}

/// One entry of the chapter registry
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChapterDef {
    pub number: usize,
    pub title: String,
    pub label: String,
    pub file: String,
    /// Text that marks the first section of a chapter whose heading is
    /// missing from the converter output
    #[serde(default)]
    pub marker: Option<String>,
    /// Patterns replaced by this chapter's heading
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ChapterDef {
    /// The `\chapter{..}` command for this entry
    pub fn heading(&self) -> String {
        format!("\\chapter{{{}}}", self.title)
    }
}

/// Acronym definition (short form -> full form)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AcronymDef {
    pub short: String,
    pub full: String,
}

impl Profile {
    /// Apply a user profile on top of this one, section by section
    pub fn overlay(mut self, file: ProfileFile) -> Self {
        if let Some(document) = file.document {
            self.document = document;
        }
        if let Some(converter) = file.converter {
            self.converter = converter;
        }
        if let Some(watch) = file.watch {
            self.watch = watch;
        }
        if let Some(headings) = file.headings {
            self.headings.overlay(headings);
        }
        if let Some(chapters) = file.chapters {
            self.chapters = chapters;
        }
        if let Some(acronyms) = file.acronyms {
            self.acronyms = acronyms;
        }
        self
    }

    /// Look up a chapter in the registry
    pub fn chapter(&self, number: usize) -> Option<&ChapterDef> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// Check the registry and tables for mistakes that would only surface
    /// halfway through a conversion
    pub fn validate(&self) -> Result<()> {
        let mut numbers = HashSet::new();
        for chapter in &self.chapters {
            if chapter.number == 0 {
                bail!("Chapter '{}' has number 0; numbering starts at 1", chapter.title);
            }
            if !numbers.insert(chapter.number) {
                bail!("Chapter number {} is registered twice", chapter.number);
            }
            if chapter.file.trim().is_empty() {
                bail!("Chapter {} has an empty output file name", chapter.number);
            }
            for pattern in &chapter.patterns {
                Regex::new(pattern).with_context(|| {
                    format!("Invalid heading pattern for chapter {}", chapter.number)
                })?;
            }
        }

        for acronym in &self.acronyms {
            if acronym.short.is_empty() || acronym.full.is_empty() {
                bail!(
                    "Acronym entry '{}' -> '{}' has an empty form",
                    acronym.short,
                    acronym.full
                );
            }
        }

        Ok(())
    }
}

impl TryFrom<ProfileFile> for Profile {
    type Error = anyhow::Error;

    /// A complete profile: chapters and acronyms must be present, the other
    /// sections fall back to their defaults
    fn try_from(file: ProfileFile) -> Result<Self> {
        let Some(chapters) = file.chapters else {
            bail!("Profile has no [[chapters]] registry");
        };
        let Some(acronyms) = file.acronyms else {
            bail!("Profile has no [[acronyms]] table");
        };

        let mut headings = HeadingSection::default();
        if let Some(overlay) = file.headings {
            headings.overlay(overlay);
        }

        Ok(Self {
            document: file.document.unwrap_or_default(),
            converter: file.converter.unwrap_or_default(),
            watch: file.watch.unwrap_or_default(),
            headings,
            chapters,
            acronyms,
        })
    }
}
