//! Note record shared by the active, draft, and trash collections.
//!
//! A note's lifecycle state (active, draft, trashed) is positional: it is
//! which collection holds the record, not a stored enum. The exceptions are
//! `deleted_at`, stamped only while the note sits in trash, and `is_draft`,
//! which exists so contamination of the active collection can be detected
//! and filtered.

use crate::domain::note_id::NoteId;
use crate::domain::tag::{self, TagInput, TagRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A short text document scoped to one account.
///
/// Serde round-trips through JSON collection payloads; legacy bare-string
/// tags are upgraded to structured [`TagRef`]s on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<TagRef>,
    /// Free-text attribution ("where this came from").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Opaque image blob descriptors; never interpreted by the core.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_refs: Vec<String>,
    /// Opaque audio blob descriptors; never interpreted by the core.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio_refs: Vec<String>,
    /// Identity assigned by the remote service; `None` = never pushed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_synced: bool,
    /// Set by merge on local-only records that have never been pushed.
    #[serde(default)]
    pub needs_upload: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub word_count: usize,
    /// Stamped at the moment of the move into trash; absent everywhere else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Contamination marker only; draft membership is positional.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_draft: bool,
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<TagRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let inputs = Vec::<TagInput>::deserialize(deserializer)?;
    Ok(tag::normalize_tags(inputs))
}

impl Note {
    /// Creates a fresh note with a generated id and current timestamps.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        let content = content.into();
        Self {
            id: NoteId::new(),
            title: title.into(),
            word_count: Self::count_words(&content),
            content,
            category: None,
            tags: Vec::new(),
            source: None,
            image_refs: Vec::new(),
            audio_refs: Vec::new(),
            remote_id: None,
            created_at: now,
            updated_at: now,
            last_synced_at: None,
            is_synced: false,
            needs_upload: false,
            is_favorite: false,
            favorited_at: None,
            deleted_at: None,
            is_draft: false,
        }
    }

    /// Word count for a content body.
    ///
    /// Character-based, so CJK text without spaces still counts sensibly.
    pub fn count_words(content: &str) -> usize {
        content.chars().count()
    }

    /// True when the record sits in trash (carries the delete stamp).
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// True when the record carries markers that must not appear in the
    /// active collection.
    pub fn carries_lifecycle_markers(&self) -> bool {
        self.deleted_at.is_some() || self.is_draft
    }

    /// Strips deletion and draft markers (used by restore and by the move
    /// into trash, which re-stamps cleanly).
    pub fn clear_lifecycle_markers(&mut self) {
        self.deleted_at = None;
        self.is_draft = false;
    }

    /// True when this record has never been assigned a remote identity.
    pub fn never_synced(&self) -> bool {
        self.remote_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tag::TagOrigin;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_note_counts_characters() {
        let note = Note::new("A", "hello");
        assert_eq!(note.word_count, 5);

        let empty = Note::new("A", "");
        assert_eq!(empty.word_count, 0);
    }

    #[test]
    fn cjk_content_counts_characters_not_whitespace_words() {
        assert_eq!(Note::count_words("你好世界"), 4);
    }

    #[test]
    fn new_note_has_no_lifecycle_markers() {
        let note = Note::new("A", "b");
        assert!(!note.is_trashed());
        assert!(!note.carries_lifecycle_markers());
        assert!(note.never_synced());
    }

    #[test]
    fn clear_lifecycle_markers_strips_both() {
        let mut note = Note::new("A", "b");
        note.deleted_at = Some(Utc::now());
        note.is_draft = true;
        note.clear_lifecycle_markers();
        assert!(note.deleted_at.is_none());
        assert!(!note.is_draft);
    }

    #[test]
    fn legacy_string_tags_upgrade_on_read() {
        let note = Note::new("A", "b");
        let mut value = serde_json::to_value(&note).unwrap();
        value["tags"] = serde_json::json!(["old-style", {"name": "typed", "origin": "user-provided"}]);

        let parsed: Note = serde_json::from_value(value).unwrap();
        assert_eq!(
            parsed.tags,
            vec![
                TagRef::ai("old-style"),
                TagRef::new("typed", TagOrigin::UserProvided),
            ]
        );
    }

    #[test]
    fn delete_stamp_omitted_when_absent() {
        let note = Note::new("A", "b");
        let json = serde_json::to_string(&note).unwrap();
        assert!(!json.contains("deleted_at"));
        assert!(!json.contains("is_draft"));
    }

    #[test]
    fn serde_roundtrip_preserves_record() {
        let mut note = Note::new("Title", "content body");
        note.tags = vec![TagRef::new("tag", TagOrigin::SourceDerived)];
        note.remote_id = Some("r-99".into());
        note.is_favorite = true;
        note.favorited_at = Some(Utc::now());

        let json = serde_json::to_string(&note).unwrap();
        let parsed: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(note, parsed);
    }

    #[test]
    fn minimal_record_fills_defaults() {
        let json = format!(
            r#"{{"id":"{}","title":"t","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}"#,
            NoteId::new()
        );
        let parsed: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.content, "");
        assert!(parsed.tags.is_empty());
        assert!(!parsed.is_synced);
        assert!(parsed.deleted_at.is_none());
    }
}
