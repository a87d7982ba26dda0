//! End-to-end conversion with a stand-in converter
use std::fs;
use std::path::Path;

use docx2chapters::chapters::backup_path;
use docx2chapters::{ConvertError, DocumentConverter, Pipeline, ProfileLoader};

/// Converter output shaped like pandoc's LaTeX for the thesis draft
const CONVERTED: &str = r#"\textbf{Thesis draft}

Title page and acknowledgements.

Background and Significance

Natural Rubber Latex (NRL) is a colloid with ~60% "dry rubber" content.

\textbf{Colloids}

NRL particles are stabilised by proteins & lipids.

\textbf{Preservation Chemistry}

Chapter 2

Literature review

\textbf{Additive Manufacturing}

Additive Manufacturing (AM) of elastomers — an overview.

\textbf{Chapter 3}

\textbf{3. Research Methodology}

\textbf{Sample Preparation}

Samples were dried at 60 °C.
"#;

struct FixedOutput(&'static str);

impl DocumentConverter for FixedOutput {
    fn convert(&self, _source: &Path) -> Result<String, ConvertError> {
        Ok(self.0.to_string())
    }
}

fn pipeline(dir: &Path, output: &'static str) -> Pipeline {
    let source = dir.join("thesis.docx");
    fs::write(&source, b"not really a docx").expect("write source");

    let profile = ProfileLoader::embedded().expect("embedded profile");
    Pipeline::new(
        profile,
        source,
        dir.join("chapters"),
        Box::new(FixedOutput(output)),
    )
    .expect("pipeline")
}

#[test]
fn test_full_conversion_writes_three_chapters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = pipeline(dir.path(), CONVERTED);

    let report = pipeline.run_at("2024-05-01 12:00:00").expect("conversion");

    assert!(report.headings_found);
    assert!(report.skipped.is_empty());
    assert_eq!(report.written.len(), 3);
    assert!(report.discarded_frontmatter > 0);
    assert_eq!(report.acronyms, vec!["NRL".to_string(), "AM".to_string()]);

    let chapters = dir.path().join("chapters");
    let ch1 = fs::read_to_string(chapters.join("chapter1.tex")).expect("chapter 1");
    let ch2 = fs::read_to_string(chapters.join("chapter2.tex")).expect("chapter 2");
    let ch3 = fs::read_to_string(chapters.join("chapter3.tex")).expect("chapter 3");

    assert!(ch1.starts_with(
        "% chapter1.tex -- Chapter 1: Introduction\n%\n% Natural Rubber Latex Thesis\n\
         % Auto-generated from Word document - 2024-05-01 12:00:00\n\n\\chapter{Introduction}"
    ));
    assert!(ch1.contains("\\section{Background and Significance}\n\\label{sec:background-and-significance}"));
    assert!(ch1.contains("\\ac{NRL} is a colloid with $\\sim$60\\% ``dry rubber'' content."));
    assert!(ch1.contains("\\section{Colloids}\n\\label{sec:colloids}"));
    assert!(ch1.contains("\\ac{NRL} particles are stabilised by proteins \\& lipids."));
    assert!(ch1.contains("\\subsection{Preservation Chemistry}\n\\label{subsec:preservation-chemistry}"));
    // Frontmatter is dropped
    assert!(!ch1.contains("Title page"));
    assert!(!ch1.contains("Thesis draft"));

    assert!(ch2.contains("\\chapter{Literature Review}\n\\label{ch:literature-review}"));
    assert!(ch2.contains("\\section{Additive Manufacturing}\n\\label{sec:additive-manufacturing}"));
    assert!(ch2.contains("\\ac{AM} of elastomers --- an overview."));

    assert!(ch3.contains("\\chapter{Research Methodology}\n\\label{ch:methodology}"));
    assert!(ch3.contains("\\subsection{Sample Preparation}\n\\label{subsec:sample-preparation}"));
    assert!(ch3.contains("60 \\textdegree{}C"));
}

#[test]
fn test_second_run_is_identical_and_backs_up_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = pipeline(dir.path(), CONVERTED);
    let chapter1 = dir.path().join("chapters").join("chapter1.tex");

    pipeline.run_at("2024-05-01 12:00:00").expect("first run");
    let first = fs::read(&chapter1).expect("first output");

    pipeline.run_at("2024-05-01 12:00:00").expect("second run");
    let second = fs::read(&chapter1).expect("second output");
    let backup = fs::read(backup_path(&chapter1)).expect("backup");

    assert_eq!(first, second);
    assert_eq!(backup, first);
}

#[test]
fn test_extra_chapter_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = pipeline(
        dir.path(),
        "\\chapter{A}\na\n\\chapter{B}\nb\n\\chapter{C}\nc\n\\chapter{D}\nd\n",
    );

    let report = pipeline.run_at("t").expect("conversion");

    assert_eq!(report.skipped, vec![4]);
    assert_eq!(report.written.len(), 3);
    let files: Vec<_> = fs::read_dir(dir.path().join("chapters"))
        .expect("read chapters dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert_eq!(files.len(), 3);
}

#[test]
fn test_no_headings_keeps_whole_text_as_chapter_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = pipeline(dir.path(), "Plain paragraph without any structure.");

    let report = pipeline.run_at("t").expect("conversion");

    assert!(!report.headings_found);
    assert_eq!(report.written.len(), 1);
    let ch1 = fs::read_to_string(dir.path().join("chapters").join("chapter1.tex"))
        .expect("chapter 1");
    assert!(ch1.ends_with("Plain paragraph without any structure."));
}
