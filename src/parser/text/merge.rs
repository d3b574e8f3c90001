//! Deciding how adjacent runs are joined.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::ResolvedFormatting;

/// Longest concatenation merged on matching formatting alone.
pub const MAX_STYLED_MERGE_LEN: usize = 24;

fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"(?i)head|title|\bh[1-6]\b").expect("heading pattern is valid"))
}

fn punctuation_regex() -> &'static Regex {
    static PUNCT: OnceLock<Regex> = OnceLock::new();
    PUNCT.get_or_init(|| Regex::new(r"^\p{P}$").expect("punctuation pattern is valid"))
}

/// Whether a paragraph style name reads as a heading.
pub fn is_heading_style(name: &str) -> bool {
    heading_regex().is_match(name)
}

/// Whether a character is Unicode punctuation.
pub fn is_punctuation(c: char) -> bool {
    let mut buf = [0u8; 4];
    punctuation_regex().is_match(c.encode_utf8(&mut buf))
}

/// One side of a run boundary.
#[derive(Debug, Clone, Copy)]
pub struct RunSide<'a> {
    /// Emitted text of the run
    pub text: &'a str,
    /// Resolved formatting of the run
    pub formatting: &'a ResolvedFormatting,
    /// Whether the run is heading-styled
    pub heading: bool,
}

/// How two adjacent runs are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// One logical token; nothing inserted
    Merge,
    /// Insert a single space
    Space,
    /// Insert an implicit line break (heading followed by body)
    Newline,
    /// Insert nothing
    Nothing,
}

/// Whether two runs form one token.
///
/// Requires no whitespace or punctuation at the boundary, and either a
/// letters-only concatenation or matching paragraph style, font family, and
/// size with a short concatenation.
pub fn should_merge(prev: RunSide<'_>, next: RunSide<'_>) -> bool {
    let (Some(last), Some(first)) = (prev.text.chars().last(), next.text.chars().next()) else {
        return false;
    };
    if last.is_whitespace() || first.is_whitespace() || is_punctuation(last) || is_punctuation(first) {
        return false;
    }

    let letters_only = prev.text.chars().chain(next.text.chars()).all(char::is_alphabetic);
    if letters_only {
        return true;
    }

    let (a, b) = (prev.formatting, next.formatting);
    a.paragraph_style == b.paragraph_style
        && a.font_family == b.font_family
        && a.font_size == b.font_size
        && prev.text.chars().count() + next.text.chars().count() <= MAX_STYLED_MERGE_LEN
}

/// Decide how `next` follows `prev` inside one paragraph.
pub fn join_runs(prev: RunSide<'_>, next: RunSide<'_>) -> Join {
    let ends_blank = prev.text.chars().last().map_or(true, char::is_whitespace);
    let starts_blank = next.text.chars().next().map_or(true, char::is_whitespace);
    if ends_blank || starts_blank || next.text.trim().is_empty() {
        return Join::Nothing;
    }
    if prev.heading && !next.heading {
        return Join::Newline;
    }
    if should_merge(prev, next) {
        return Join::Merge;
    }

    let boundary_punct = prev.text.chars().last().is_some_and(is_punctuation)
        || next.text.chars().next().is_some_and(is_punctuation);
    if boundary_punct {
        Join::Nothing
    } else {
        Join::Space
    }
}
