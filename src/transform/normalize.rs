//! Character and punctuation normalization.
//!
//! Rewrites symbols the converter leaves as raw Unicode (or escapes
//! awkwardly) into their LaTeX spellings. The order of the steps matters:
//! `%` and `&` are escaped last so nothing inserted earlier gets escaped twice.

use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};

static TEXTASCIITILDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\textasciitilde\s*").expect("valid regex"));
static TILDE_BEFORE_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~(\d)").expect("valid regex"));
static STRAIGHT_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid regex"));

/// Chemical formulas with their subscripted form
static FORMULAS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bCO2\b", "CO$_2$"),
        (r"\bCH4\b", "CH$_4$"),
        (r"\bH2O\b", "H$_2$O"),
        (r"\bO2\b", "O$_2$"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

const SIM: &str = "$\\sim$";

/// Apply every character fix in order
pub fn normalize(content: &str) -> String {
    // Approximate symbol
    let content = TEXTASCIITILDE.replace_all(content, NoExpand(SIM));
    let content = TILDE_BEFORE_DIGIT.replace_all(&content, |caps: &Captures| {
        format!("{}{}", SIM, &caps[1])
    });

    let mut content = content.replace('°', "\\textdegree{}");

    for (pattern, replacement) in FORMULAS.iter() {
        content = pattern
            .replace_all(&content, NoExpand(*replacement))
            .into_owned();
    }

    let content = content.replace('×', "$\\times$");

    let content = STRAIGHT_QUOTES.replace_all(&content, |caps: &Captures| {
        format!("``{}''", &caps[1])
    });

    let content = content.replace('—', "---").replace('–', "--");

    let content = escape_unescaped(&content, '%', false);
    escape_unescaped(&content, '&', true)
}

/// Prefix every `target` with a backslash unless it is already escaped.
///
/// With `guard_following`, a `target` directly followed by a backslash is
/// left alone too (`&\\` in tabular rows).
fn escape_unescaped(content: &str, target: char, guard_following: bool) -> String {
    let mut out = String::with_capacity(content.len());
    let mut prev: Option<char> = None;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == target
            && prev != Some('\\')
            && !(guard_following && chars.peek() == Some(&'\\'))
        {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_symbol() {
        assert_eq!(normalize("~5 nm"), "$\\sim$5 nm");
        assert_eq!(normalize("\\textasciitilde 20"), "$\\sim$20");
        // A tilde not followed by a digit is a LaTeX tie and stays
        assert_eq!(normalize("Fig.~a"), "Fig.~a");
    }

    #[test]
    fn test_degree_and_times() {
        assert_eq!(normalize("60 °C"), "60 \\textdegree{}C");
        assert_eq!(normalize("3 × 5"), "3 $\\times$ 5");
    }

    #[test]
    fn test_chemical_formulas() {
        assert_eq!(
            normalize("CO2, CH4, H2O and O2 but not CO2X"),
            "CO$_2$, CH$_4$, H$_2$O and O$_2$ but not CO2X"
        );
    }

    #[test]
    fn test_quotes_and_dashes() {
        assert_eq!(
            normalize("the \"jammed\" state — stable – mostly"),
            "the ``jammed'' state --- stable -- mostly"
        );
    }

    #[test]
    fn test_percent_and_ampersand() {
        assert_eq!(normalize("5% & 10\\%"), "5\\% \\& 10\\%");
        assert_eq!(normalize("%%"), "\\%\\%");
        // Row terminator in tabular stays untouched
        assert_eq!(normalize("a &\\\\"), "a &\\\\");
        assert_eq!(normalize("R\\&D"), "R\\&D");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = "About ~5% of \"NRL\" & CO2 at 25 °C — 3 × 2 – x";
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }
}
