//! Remote API call contract and wire record mapping.
//!
//! The remote service of record exposes two endpoint families (notes and
//! drafts) behind the same call contract. Transport is out of scope here:
//! implementations live behind [`RemoteCollection`], and every wire
//! response arrives as an [`ApiEnvelope`].

use crate::domain::{Note, TagInput, normalize_tags};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the remote collaborator.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The service answered with `success: false`.
    #[error("remote API error: {0}")]
    Api(String),

    /// The call never produced a usable response.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The `{success, data | error}` envelope every remote call returns.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the envelope into the carried payload.
    pub fn into_result(self) -> RemoteResult<T> {
        if !self.success {
            return Err(RemoteError::Api(
                self.error.unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| RemoteError::Api("successful response carried no data".to_string()))
    }

    /// Unwraps an acknowledgement envelope, discarding any payload.
    pub fn into_ack(self) -> RemoteResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(RemoteError::Api(
                self.error.unwrap_or_else(|| "unspecified error".to_string()),
            ))
        }
    }
}

/// Identity returned by a remote create.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCreated {
    pub id: String,
}

/// One page of a remote listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemotePage {
    pub items: Vec<RemoteItem>,
    #[serde(default)]
    pub total: u64,
}

/// A remote record together with its remote identity.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    #[serde(flatten)]
    pub record: RemoteRecord,
}

/// A note in the remote service's wire shape.
///
/// Field names are camelCase on the wire; tags travel as a JSON-encoded
/// string payload; absent fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    /// The client-assigned note id, echoed back by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// JSON-encoded tag list; may contain legacy bare strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_refs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio_refs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl RemoteRecord {
    /// Maps a local note into the wire shape for create/update calls.
    pub fn from_note(note: &Note) -> Self {
        let tags = if note.tags.is_empty() {
            None
        } else {
            // Tag lists are small; encoding cannot realistically fail, but
            // a lost tags payload is still better than a lost push.
            serde_json::to_string(&note.tags).ok()
        };
        Self {
            note_id: Some(note.id.to_string()),
            title: note.title.clone(),
            content: note.content.clone(),
            category: note.category.clone(),
            tags,
            source: note.source.clone(),
            image_refs: note.image_refs.clone(),
            audio_refs: note.audio_refs.clone(),
            create_time: Some(note.created_at),
            update_time: Some(note.updated_at),
            is_favorite: note.is_favorite,
        }
    }
}

impl RemoteItem {
    /// Maps a pulled remote item into local shape.
    ///
    /// Returns `None` (with a diagnostic) when the record carries no usable
    /// client id; such records cannot participate in the id-based merge.
    pub fn into_note(self) -> Option<Note> {
        let raw_id = self.record.note_id.as_deref().unwrap_or_default();
        let id = match raw_id.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(
                    "remote item {} has no usable client id ({raw_id:?}); skipped",
                    self.id
                );
                return None;
            }
        };

        let tags = match self.record.tags.as_deref() {
            None | Some("") => Vec::new(),
            Some(payload) => match serde_json::from_str::<Vec<TagInput>>(payload) {
                Ok(inputs) => normalize_tags(inputs),
                Err(err) => {
                    warn!("remote item {}: undecodable tags payload: {err}", self.id);
                    Vec::new()
                }
            },
        };

        let now = Utc::now();
        let created_at = self.record.create_time.unwrap_or(now);
        Some(Note {
            id,
            title: self.record.title,
            word_count: Note::count_words(&self.record.content),
            content: self.record.content,
            category: self.record.category,
            tags,
            source: self.record.source,
            image_refs: self.record.image_refs,
            audio_refs: self.record.audio_refs,
            remote_id: Some(self.id),
            created_at,
            updated_at: self.record.update_time.unwrap_or(created_at),
            last_synced_at: Some(now),
            is_synced: true,
            needs_upload: false,
            is_favorite: self.record.is_favorite,
            favorited_at: None,
            deleted_at: None,
            is_draft: false,
        })
    }
}

/// The consumed remote endpoint contract (one endpoint family).
pub trait RemoteCollection {
    fn create(&self, record: &RemoteRecord) -> RemoteResult<RemoteCreated>;
    fn update(&self, id: &str, record: &RemoteRecord) -> RemoteResult<()>;
    fn list(&self, page: u32, limit: u32) -> RemoteResult<RemotePage>;
    fn delete(&self, id: &str) -> RemoteResult<()>;
}

impl<T: RemoteCollection + ?Sized> RemoteCollection for &T {
    fn create(&self, record: &RemoteRecord) -> RemoteResult<RemoteCreated> {
        (**self).create(record)
    }
    fn update(&self, id: &str, record: &RemoteRecord) -> RemoteResult<()> {
        (**self).update(id, record)
    }
    fn list(&self, page: u32, limit: u32) -> RemoteResult<RemotePage> {
        (**self).list(page, limit)
    }
    fn delete(&self, id: &str) -> RemoteResult<()> {
        (**self).delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TagOrigin, TagRef};
    use pretty_assertions::assert_eq;

    #[test]
    fn envelope_success_yields_data() {
        let env: ApiEnvelope<u32> = serde_json::from_str(r#"{"success": true, "data": 7}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), 7);
    }

    #[test]
    fn envelope_failure_yields_api_error() {
        let env: ApiEnvelope<u32> =
            serde_json::from_str(r#"{"success": false, "error": "nope"}"#).unwrap();
        let err = env.into_result().unwrap_err();
        assert!(matches!(err, RemoteError::Api(msg) if msg == "nope"));
    }

    #[test]
    fn envelope_success_without_data_is_an_error() {
        let env: ApiEnvelope<u32> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(env.into_result().is_err());
    }

    #[test]
    fn ack_envelope_ignores_missing_data() {
        let env: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(env.into_ack().is_ok());
    }

    #[test]
    fn record_roundtrips_through_wire_shape() {
        let mut note = Note::new("Title", "body");
        note.tags = vec![TagRef::new("tag", TagOrigin::UserProvided)];
        note.category = Some("cat".into());

        let record = RemoteRecord::from_note(&note);
        assert_eq!(record.note_id.as_deref(), Some(note.id.to_string().as_str()));

        let item = RemoteItem {
            id: "r-1".into(),
            record,
        };
        let mapped = item.into_note().unwrap();
        assert_eq!(mapped.id, note.id);
        assert_eq!(mapped.title, note.title);
        assert_eq!(mapped.tags, note.tags);
        assert_eq!(mapped.remote_id.as_deref(), Some("r-1"));
        assert!(mapped.is_synced);
    }

    #[test]
    fn wire_fields_are_camel_case() {
        let note = Note::new("T", "c");
        let json = serde_json::to_string(&RemoteRecord::from_note(&note)).unwrap();
        assert!(json.contains("noteId"));
        assert!(json.contains("createTime"));
        assert!(!json.contains("note_id"));
    }

    #[test]
    fn legacy_string_tags_decode_from_wire_payload() {
        let item = RemoteItem {
            id: "r-2".into(),
            record: RemoteRecord {
                note_id: Some(crate::domain::NoteId::new().to_string()),
                title: "t".into(),
                tags: Some(r#"["bare", {"name": "typed", "origin": "source-derived"}]"#.into()),
                ..Default::default()
            },
        };
        let note = item.into_note().unwrap();
        assert_eq!(
            note.tags,
            vec![
                TagRef::ai("bare"),
                TagRef::new("typed", TagOrigin::SourceDerived),
            ]
        );
    }

    #[test]
    fn undecodable_tags_payload_defaults_to_empty() {
        let item = RemoteItem {
            id: "r-3".into(),
            record: RemoteRecord {
                note_id: Some(crate::domain::NoteId::new().to_string()),
                title: "t".into(),
                tags: Some("not json".into()),
                ..Default::default()
            },
        };
        assert!(item.into_note().unwrap().tags.is_empty());
    }

    #[test]
    fn item_without_client_id_is_skipped() {
        let item = RemoteItem {
            id: "r-4".into(),
            record: RemoteRecord {
                title: "orphan".into(),
                ..Default::default()
            },
        };
        assert!(item.into_note().is_none());
    }
}
