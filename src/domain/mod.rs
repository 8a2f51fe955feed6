//! Domain value types: notes, tags, identifiers, account scoping.

mod account;
mod note;
mod note_id;
mod source;
mod tag;

pub use account::{ANONYMOUS_NAMESPACE, AccountContext, CollectionKind};
pub use note::Note;
pub use note_id::{NoteId, ParseNoteIdError};
pub use source::{MAX_SOURCE_TAG_CHARS, derive_source_tags};
pub use tag::{
    TagInput, TagOrigin, TagRef, contains_name, extract_names, merge_tag_names, names_match,
    normalize_tags,
};
