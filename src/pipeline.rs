//! Conversion pipeline.
//!
//! Converter -> normalize -> acronyms -> headings -> split -> write, run as
//! one unit. The watch loop calls [`Pipeline::run_once`] for every accepted
//! change.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::chapters::{split_chapters, ChapterWriter, TIMESTAMP_FORMAT};
use crate::config::Config;
use crate::converter::{ConvertError, DocumentConverter, Pandoc};
use crate::profile::{LoadedProfile, Profile};
use crate::transform::{fold_acronyms, normalize, HeadingRules};

/// Outcome of one successful conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    pub written: Vec<PathBuf>,
    /// Chapter numbers produced by the split but missing from the registry
    pub skipped: Vec<usize>,
    pub headings_found: bool,
    pub discarded_frontmatter: usize,
    /// Acronyms whose full form was found
    pub acronyms: Vec<String>,
}

/// Everything needed to turn the source document into chapter files
pub struct Pipeline {
    source: PathBuf,
    profile: Profile,
    rules: HeadingRules,
    writer: ChapterWriter,
    converter: Box<dyn DocumentConverter>,
}

impl Pipeline {
    pub fn new(
        profile: Profile,
        source: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        converter: Box<dyn DocumentConverter>,
    ) -> Result<Self> {
        let rules = HeadingRules::from_profile(&profile)?;
        let writer = ChapterWriter::new(output_dir, profile.document.title.clone());

        Ok(Self {
            source: source.into(),
            profile,
            rules,
            writer,
            converter,
        })
    }

    /// Build the production pipeline: command-line overrides win over the
    /// profile, and profile paths are relative to the profile file
    pub fn from_config(config: &Config, loaded: LoadedProfile) -> Result<Self> {
        let source = match (&config.source, &loaded.profile.document.source) {
            (Some(cli), _) => cli.clone(),
            (None, Some(path)) => loaded.resolve(path),
            (None, None) => {
                return Err(anyhow!(
                    "No source document configured; pass --source or set document.source in the profile"
                ));
            }
        };

        let output_dir = match (&config.output_dir, &loaded.profile.document.chapters_dir) {
            (Some(cli), _) => cli.clone(),
            (None, Some(path)) => loaded.resolve(path),
            (None, None) => {
                return Err(anyhow!(
                    "No output directory configured; pass --output-dir or set document.chapters_dir in the profile"
                ));
            }
        };

        let mut pandoc = Pandoc::new(&loaded.profile.converter);
        if let Some(program) = &config.pandoc {
            pandoc = pandoc.with_program(program.clone());
        }
        log::debug!("Converter program: {}", pandoc.program());

        Self::new(loaded.profile, source, output_dir, Box::new(pandoc))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.output_dir()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Apply the text passes to raw converter output
    pub fn process(&self, raw: &str) -> String {
        self.process_with_acronyms(raw).0
    }

    fn process_with_acronyms(&self, raw: &str) -> (String, Vec<String>) {
        let content = normalize(raw);
        let fold = fold_acronyms(&content, &self.profile.acronyms);
        (self.rules.apply(&fold.text), fold.introduced)
    }

    /// Convert, process and write with an explicit header timestamp
    pub fn run_at(&self, generated_at: &str) -> Result<ConversionReport> {
        if !self.source.exists() {
            return Err(ConvertError::SourceMissing(self.source.clone()).into());
        }

        let raw = self.converter.convert(&self.source)?;
        let (content, acronyms) = self.process_with_acronyms(&raw);

        let split = split_chapters(&content);
        let written = self
            .writer
            .write_all(&split, &self.profile.chapters, generated_at)?;

        log::info!("Conversion complete!");

        Ok(ConversionReport {
            written: written.written,
            skipped: written.skipped,
            headings_found: split.headings_found,
            discarded_frontmatter: split.discarded_frontmatter,
            acronyms,
        })
    }

    /// Full conversion stamped with the current local time
    pub fn run_once(&self) -> Result<ConversionReport> {
        let now = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.run_at(&now)
    }
}
