//! Heading reconstruction.
//!
//! The converter output rarely carries real headings: chapter titles arrive
//! as loose text and section titles as bold runs. This module rebuilds the
//! structure from an ordered list of rules compiled from the profile,
//! followed by a line pass for converter wrappers and leftover bold lines.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{NoExpand, Regex, RegexBuilder};

use crate::profile::{ChapterDef, Profile};

static HYPERTARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\\hypertarget\{[^}]*\}\{(?:\\?%)?\s*\\(chapter|section|subsection|subsubsection)\{([^}]*)\}[^}]*\}",
    )
    .expect("valid regex")
});
static BOLD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\textbf\{([^}]+)\}$").expect("valid regex"));

/// Bold lines at least this long are treated as body text
const MAX_HEADING_CHARS: usize = 100;

/// Sectioning level a bold title is promoted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Section,
    Subsection,
}

impl Level {
    fn command(self) -> &'static str {
        match self {
            Level::Section => "section",
            Level::Subsection => "subsection",
        }
    }

    fn label_prefix(self) -> &'static str {
        match self {
            Level::Section => "sec",
            Level::Subsection => "subsec",
        }
    }
}

/// What a rule does with its match
#[derive(Debug, Clone)]
pub enum HeadingAction {
    /// Replace the first match with a chapter heading followed by the matched
    /// text as its first section, unless the chapter heading already exists
    InjectChapter { heading: String, replacement: String },
    /// Replace every match with a chapter heading
    Chapter { replacement: String },
    /// Replace every match with a sectioning command
    Promote { level: Level, replacement: String },
}

/// A pattern and the structural action taken on it
#[derive(Debug, Clone)]
pub struct HeadingRule {
    pub name: String,
    pub pattern: Regex,
    pub action: HeadingAction,
}

impl HeadingRule {
    /// Apply this rule, returning the rewritten text and whether it fired
    pub fn apply(&self, content: &str) -> (String, bool) {
        match &self.action {
            HeadingAction::InjectChapter {
                heading,
                replacement,
            } => {
                if content.contains(heading.as_str()) || !self.pattern.is_match(content) {
                    return (content.to_string(), false);
                }
                let out = self
                    .pattern
                    .replacen(content, 1, NoExpand(replacement))
                    .into_owned();
                (out, true)
            }
            HeadingAction::Chapter { replacement }
            | HeadingAction::Promote { replacement, .. } => {
                if !self.pattern.is_match(content) {
                    return (content.to_string(), false);
                }
                let out = self
                    .pattern
                    .replace_all(content, NoExpand(replacement))
                    .into_owned();
                (out, true)
            }
        }
    }
}

/// The ordered rule list plus the line pass
#[derive(Debug, Clone)]
pub struct HeadingRules {
    rules: Vec<HeadingRule>,
}

impl HeadingRules {
    /// Compile the rules for a profile.
    ///
    /// Order: injected chapter headings, chapter patterns, section titles,
    /// subsection titles.
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        let mut rules = Vec::new();

        for chapter in &profile.chapters {
            if let Some(marker) = &chapter.marker {
                rules.push(inject_rule(chapter, marker)?);
            }
        }

        for chapter in &profile.chapters {
            for (i, pattern) in chapter.patterns.iter().enumerate() {
                let compiled = Regex::new(pattern).with_context(|| {
                    format!("Invalid heading pattern for chapter {}", chapter.number)
                })?;
                rules.push(HeadingRule {
                    name: format!("chapter {} pattern {}", chapter.number, i + 1),
                    pattern: compiled,
                    action: HeadingAction::Chapter {
                        replacement: chapter_heading(chapter),
                    },
                });
            }
        }

        for title in &profile.headings.sections {
            rules.push(promote_rule(title, Level::Section)?);
        }
        for title in &profile.headings.subsections {
            rules.push(promote_rule(title, Level::Subsection)?);
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[HeadingRule] {
        &self.rules
    }

    /// Run every rule in order, then the line pass
    pub fn apply(&self, content: &str) -> String {
        let mut content = content.to_string();

        for rule in &self.rules {
            let (out, fired) = rule.apply(&content);
            if fired {
                log::debug!("Heading rule '{}' applied", rule.name);
            }
            content = out;
        }

        rewrite_lines(&content)
    }
}

/// Lowercase, spaces to hyphens, drop everything but `[a-z0-9-]`
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

fn chapter_heading(chapter: &ChapterDef) -> String {
    format!("{}\n\\label{{{}}}", chapter.heading(), chapter.label)
}

fn sectioning(command: &str, title: &str, label: &str) -> String {
    format!("\\{}{{{}}}\n\\label{{{}}}", command, title, label)
}

fn inject_rule(chapter: &ChapterDef, marker: &str) -> Result<HeadingRule> {
    let replacement = format!(
        "{}\n\n{}",
        chapter_heading(chapter),
        sectioning("section", marker, &format!("sec:{}", slugify(marker)))
    );

    let pattern = Regex::new(&regex::escape(marker))
        .with_context(|| format!("Invalid marker for chapter {}", chapter.number))?;

    Ok(HeadingRule {
        name: format!("chapter {} before '{}'", chapter.number, marker),
        pattern,
        action: HeadingAction::InjectChapter {
            heading: chapter.heading(),
            replacement,
        },
    })
}

/// `\textbf{<title>...}` anywhere, case-insensitive
fn promote_rule(title: &str, level: Level) -> Result<HeadingRule> {
    let pattern = RegexBuilder::new(&format!(r"\\textbf\{{{}[^}}]*\}}", regex::escape(title)))
        .case_insensitive(true)
        .build()
        .with_context(|| format!("Invalid heading title '{}'", title))?;

    let label = format!("{}:{}", level.label_prefix(), slugify(title));

    Ok(HeadingRule {
        name: format!("{} '{}'", level.command(), title),
        pattern,
        action: HeadingAction::Promote {
            level,
            replacement: sectioning(level.command(), title, &label),
        },
    })
}

/// Unwrap converter hypertargets and promote leftover bold-only lines
fn rewrite_lines(content: &str) -> String {
    let mut result: Vec<String> = Vec::new();

    for line in content.split('\n') {
        let stripped = line.trim();

        if let Some(caps) = HYPERTARGET.captures(stripped) {
            let cmd = &caps[1];
            let title = &caps[2];
            let prefix = if cmd == "chapter" { "ch" } else { "sec" };
            result.push(format!("\\{}{{{}}}", cmd, title));
            result.push(format!("\\label{{{}:{}}}", prefix, slugify(title)));
            continue;
        }

        // Heuristic: a short bold line that is not a sentence is a heading.
        // Short bold body text gets promoted too.
        if let Some(caps) = BOLD_LINE.captures(stripped) {
            let title = &caps[1];
            if title.chars().count() < MAX_HEADING_CHARS && !title.ends_with('.') {
                result.push(format!("\\subsection*{{{}}}", title));
                result.push(format!("\\label{{subsec:{}}}", slugify(title)));
                continue;
            }
        }

        result.push(line.to_string());
    }

    result.join("\n")
}
