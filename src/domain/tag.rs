//! Canonical tag representation and normalization.
//!
//! Stored records may present tags in two shapes: a bare string (legacy
//! records) or a structured `{name, origin}` object. Both are resolved to
//! the canonical [`TagRef`] at this boundary; nothing deeper in the call
//! graph branches on shape. All name comparisons are case-insensitive and
//! origin-independent.

use serde::{Deserialize, Serialize};

/// Where a tag came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagOrigin {
    /// Suggested by an AI helper (also the default for legacy bare strings).
    AiGenerated,
    /// Entered by the user.
    UserProvided,
    /// Derived from the note's source attribution.
    SourceDerived,
}

/// Canonical tag: a name plus its origin.
///
/// Normalization does not deduplicate names within one note's tag list;
/// equality and containment checks compare names case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub name: String,
    pub origin: TagOrigin,
}

impl TagRef {
    /// Creates a tag with an explicit origin.
    pub fn new(name: impl Into<String>, origin: TagOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    /// Creates an AI-generated tag (the legacy default).
    pub fn ai(name: impl Into<String>) -> Self {
        Self::new(name, TagOrigin::AiGenerated)
    }

    /// Case-insensitive, origin-independent name comparison.
    pub fn matches(&self, other: &TagRef) -> bool {
        names_match(&self.name, &other.name)
    }
}

/// A tag as it may appear in stored or remote payloads.
///
/// Untagged union: a JSON object parses as `Structured`, a JSON string as
/// `Legacy`. Resolved to [`TagRef`] by [`normalize_tags`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    Structured {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<TagOrigin>,
    },
    Legacy(String),
}

impl From<TagRef> for TagInput {
    fn from(tag: TagRef) -> Self {
        TagInput::Structured {
            name: tag.name,
            origin: Some(tag.origin),
        }
    }
}

/// Resolves heterogeneous tag inputs into the canonical shape.
///
/// Bare strings become `{name, ai-generated}`; structured inputs pass
/// through, defaulting a missing origin to `ai-generated`. Entries whose
/// name trims to empty are dropped. Idempotent: normalizing an already
/// canonical list yields the same list.
pub fn normalize_tags(inputs: Vec<TagInput>) -> Vec<TagRef> {
    inputs
        .into_iter()
        .filter_map(|input| {
            let tag = match input {
                TagInput::Legacy(name) => TagRef::ai(name),
                TagInput::Structured { name, origin } => {
                    TagRef::new(name, origin.unwrap_or(TagOrigin::AiGenerated))
                }
            };
            if tag.name.trim().is_empty() {
                None
            } else {
                Some(tag)
            }
        })
        .collect()
}

/// Returns the tag names in list order.
pub fn extract_names(tags: &[TagRef]) -> Vec<String> {
    tags.iter().map(|t| t.name.clone()).collect()
}

/// Case-insensitive name comparison.
pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// True when `tags` contains `target` by case-insensitive name.
pub fn contains_name(tags: &[TagRef], target: &str) -> bool {
    tags.iter().any(|t| names_match(&t.name, target))
}

/// Deduplicated union of two name lists, primary entries first.
///
/// Duplicates are detected case-insensitively; the first-seen spelling and
/// order are preserved.
pub fn merge_tag_names(primary: &[String], secondary: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for name in primary.iter().chain(secondary.iter()) {
        if seen.insert(name.to_lowercase()) {
            merged.push(name.clone());
        }
    }
    merged
}
