//! Tokenizer turning free-text source attribution into tag names.
//!
//! A source line like `《围城》, 钱锺书` or `《Book One》, Alice; Bob` mixes
//! book titles with author names. Book-title marks (`《...》`) are held
//! atomic; the remaining text splits on list punctuation and whitespace.
//! Plain periods are not separators, so initials like "J. R. R." survive
//! inside a token.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Tokens longer than this are discarded (they are prose, not tags).
pub const MAX_SOURCE_TAG_CHARS: usize = 20;

static BOOK_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"《([^《》]+)》").expect("valid book title regex"));

// List separators, ASCII and fullwidth. Deliberately excludes `.`.
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:|/、，；：《》\s]+").expect("valid separator regex"));

/// Tokenizes a source attribution into candidate tag names.
///
/// Bracketed `《...》` spans stay atomic and keep their position relative to
/// the surrounding tokens. Tokens that are empty, longer than
/// [`MAX_SOURCE_TAG_CHARS`], purely digits/whitespace, or purely punctuation
/// are dropped. The result is deduplicated case-insensitively, preserving
/// first-seen order.
///
/// ```
/// use satchel::domain::derive_source_tags;
///
/// let tags = derive_source_tags("《Book One》, Alice; Bob");
/// assert_eq!(tags, vec!["Book One", "Alice", "Bob"]);
/// ```
pub fn derive_source_tags(text: &str) -> Vec<String> {
    let mut raw: Vec<String> = Vec::new();
    let mut last = 0;

    for caps in BOOK_TITLE_RE.captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        split_segment(&text[last..whole.start()], &mut raw);
        raw.push(caps[1].trim().to_string());
        last = whole.end();
    }
    split_segment(&text[last..], &mut raw);

    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|token| is_usable_token(token))
        .filter(|token| seen.insert(token.to_lowercase()))
        .collect()
}

fn split_segment(segment: &str, out: &mut Vec<String>) {
    for part in SEPARATOR_RE.split(segment) {
        let trimmed = part.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
}

fn is_usable_token(token: &str) -> bool {
    if token.is_empty() || token.chars().count() > MAX_SOURCE_TAG_CHARS {
        return false;
    }
    if token.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()) {
        return false;
    }
    // Purely punctuation: nothing alphanumeric anywhere in the token.
    if token.chars().all(|c| !c.is_alphanumeric()) {
        return false;
    }
    true
}
