//! Chapter Splitter
//!
//! Cuts the reconstructed document at its `\chapter{..}` commands.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static CHAPTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\chapter\{([^}]*)\}").expect("valid regex"));

/// Chapter number -> chapter text, plus what was dropped on the way
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChapterSplit {
    pub chapters: BTreeMap<usize, String>,
    /// Characters of text found before the first chapter heading
    pub discarded_frontmatter: usize,
    /// False when the whole document was kept as chapter 1 for lack of headings
    pub headings_found: bool,
}

/// Split text into chapters numbered from 1 in document order
pub fn split_chapters(content: &str) -> ChapterSplit {
    let starts: Vec<usize> = CHAPTER.find_iter(content).map(|m| m.start()).collect();

    let Some(&first) = starts.first() else {
        log::warn!("No \\chapter{{}} commands found. Content may need manual review.");
        return ChapterSplit {
            chapters: BTreeMap::from([(1, content.to_string())]),
            discarded_frontmatter: 0,
            headings_found: false,
        };
    };

    let frontmatter = content[..first].trim();
    let discarded_frontmatter = frontmatter.chars().count();
    if discarded_frontmatter > 0 {
        log::info!(
            "Removed {} characters of frontmatter before Chapter 1",
            discarded_frontmatter
        );
    }

    let chapters = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(content.len());
            (i + 1, content[start..end].trim().to_string())
        })
        .collect();

    ChapterSplit {
        chapters,
        discarded_frontmatter,
        headings_found: true,
    }
}
