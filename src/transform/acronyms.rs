//! Acronym folding.
//!
//! "Natural Rubber Latex (NRL)" becomes `\ac{NRL}`, and once an acronym has
//! been introduced, later bare `NRL` tokens become `\ac{NRL}` as well.

use std::collections::HashSet;

use regex::{NoExpand, Regex, RegexBuilder};

use crate::profile::AcronymDef;

const TAG_OPEN: &str = "\\ac{";

/// Result of folding acronyms into a document
#[derive(Debug, Clone, PartialEq)]
pub struct AcronymFold {
    pub text: String,
    /// Short forms whose full form was found, in table order
    pub introduced: Vec<String>,
}

/// The tagged reference for a short form
pub fn tag(short: &str) -> String {
    format!("{}{}}}", TAG_OPEN, short)
}

/// Fold acronyms in a single forward pass over the table.
///
/// A short form is only folded once its full form appeared, and only from
/// that point of the text onwards.
pub fn fold_acronyms(content: &str, acronyms: &[AcronymDef]) -> AcronymFold {
    let mut content = content.to_string();
    let mut introduced = Vec::new();
    let mut seen = HashSet::new();

    for acronym in acronyms {
        let Some(intro) = introduction_pattern(acronym) else {
            continue;
        };

        let Some(first) = intro.find(&content).map(|m| m.start()) else {
            continue;
        };

        let tagged = tag(&acronym.short);
        content = intro
            .replace_all(&content, NoExpand(&tagged))
            .into_owned();

        if seen.insert(acronym.short.clone()) {
            introduced.push(acronym.short.clone());
        }

        content = fold_bare(&content, &acronym.short, &tagged, first);
    }

    AcronymFold {
        text: content,
        introduced,
    }
}

/// `Full Form (SHORT)`, case-insensitive, any whitespace before the parenthesis
fn introduction_pattern(acronym: &AcronymDef) -> Option<Regex> {
    let pattern = format!(
        r"{}\s*\({}\)",
        regex::escape(&acronym.full),
        regex::escape(&acronym.short)
    );

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Skipping acronym '{}': {}", acronym.short, e);
            None
        }
    }
}

/// Replace standalone `short` tokens at or after byte offset `from`.
///
/// A token is standalone when it is not preceded by an ASCII letter or by
/// `\ac{`, and not followed by an ASCII letter or `}`.
fn fold_bare(content: &str, short: &str, tagged: &str, from: usize) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for (start, token) in content.match_indices(short) {
        let end = start + token.len();
        if start < from || start < last {
            continue;
        }

        let before = &content[..start];
        let preceded_by_letter = before
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphabetic());
        let followed_by_blocker = content[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '}');

        if preceded_by_letter || followed_by_blocker || before.ends_with(TAG_OPEN) {
            continue;
        }

        out.push_str(&content[last..start]);
        out.push_str(tagged);
        last = end;
    }

    out.push_str(&content[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> Vec<AcronymDef> {
        entries
            .iter()
            .map(|(short, full)| AcronymDef {
                short: short.to_string(),
                full: full.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_full_form_then_bare_token() {
        let acronyms = table(&[("NRL", "Natural Rubber Latex")]);
        let fold = fold_acronyms(
            "Natural Rubber Latex (NRL) is a colloid. NRL is harvested.",
            &acronyms,
        );

        assert_eq!(fold.text, "\\ac{NRL} is a colloid. \\ac{NRL} is harvested.");
        assert_eq!(fold.introduced, vec!["NRL".to_string()]);
    }

    #[test]
    fn test_bare_token_before_introduction_untouched() {
        let acronyms = table(&[("NRL", "Natural Rubber Latex")]);
        let fold = fold_acronyms(
            "NRL first. Then natural rubber latex (NRL). Then NRL.",
            &acronyms,
        );

        assert_eq!(fold.text, "NRL first. Then \\ac{NRL}. Then \\ac{NRL}.");
    }

    #[test]
    fn test_never_introduced_left_alone() {
        let acronyms = table(&[("DLS", "Dynamic Light Scattering")]);
        let fold = fold_acronyms("DLS was used.", &acronyms);

        assert_eq!(fold.text, "DLS was used.");
        assert!(fold.introduced.is_empty());
    }

    #[test]
    fn test_prefix_acronym_not_folded_inside_longer_one() {
        let acronyms = table(&[
            ("NRL", "Natural Rubber Latex"),
            ("NR", "Natural Rubber"),
        ]);
        let fold = fold_acronyms(
            "Natural Rubber Latex (NRL) differs from Natural Rubber (NR); NR and NRL.",
            &acronyms,
        );

        assert_eq!(
            fold.text,
            "\\ac{NRL} differs from \\ac{NR}; \\ac{NR} and \\ac{NRL}."
        );
        assert_eq!(fold.introduced, vec!["NRL".to_string(), "NR".to_string()]);
    }

    #[test]
    fn test_word_boundaries() {
        let acronyms = table(&[("PU", "Polyurethane")]);
        let fold = fold_acronyms("Polyurethane (PU) vs PUR, TPU and PU-based", &acronyms);

        // Letters on either side block folding; punctuation does not
        assert_eq!(fold.text, "\\ac{PU} vs PUR, TPU and \\ac{PU}-based");
    }

    #[test]
    fn test_special_characters_in_forms() {
        let acronyms = table(&[("O/W", "Oil-in-Water")]);
        let fold = fold_acronyms("an oil-in-water (O/W) emulsion; O/W droplets", &acronyms);

        assert_eq!(fold.text, "an \\ac{O/W} emulsion; \\ac{O/W} droplets");
    }
}
