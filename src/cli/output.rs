//! Output format types for CLI commands.

use crate::domain::Note;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A single note in listing output.
#[derive(Debug, Serialize)]
pub struct NoteListing {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub favorite: bool,
    pub updated_at: String,
}

impl NoteListing {
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title.clone(),
            category: note.category.clone(),
            tags: crate::domain::extract_names(&note.tags),
            favorite: note.is_favorite,
            updated_at: note.updated_at.to_rfc3339(),
        }
    }

    /// One-line human rendering: `01HQ3K5M7N  ★ Title  [tags]`.
    pub fn human_line(&self, id_prefix: &str) -> String {
        let star = if self.favorite { "★ " } else { "" };
        if self.tags.is_empty() {
            format!("{id_prefix}  {star}{}", self.title)
        } else {
            format!("{id_prefix}  {star}{}  [{}]", self.title, self.tags.join(", "))
        }
    }
}
