//! Editable note projection.
//!
//! # Responsibility
//! - Project a `CompactNote` into the denormalized shape the editor mutates.
//! - Convert between tag lists and the `#tag #tag` text the editor shows.
//! - Decide whether an edit session is dirty.
//! - Serialize the save payload expected by the network layer.
//!
//! # Invariants
//! - Projection is one-way; an `EditableNote` is never written back into a
//!   positional record.
//! - Empty tags are discarded when parsing tag text.

use crate::model::compact_note::{tags_eq, CompactNote, NoteFormat};
use serde::Serialize;

/// Working copy owned by one editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableNote {
    /// Server id; `None` for a note that has never been saved.
    pub id: Option<String>,
    pub title: String,
    /// Tags as editor text, e.g. `#work #todo`.
    pub tags: String,
    pub body: String,
    pub is_public: bool,
    pub format: NoteFormat,
}

impl EditableNote {
    /// Fresh note used for "new note" and after discard.
    pub fn empty() -> Self {
        Self {
            id: None,
            title: String::new(),
            tags: String::new(),
            body: String::new(),
            is_public: false,
            format: NoteFormat::Markdown,
        }
    }

    /// One-way projection from a compact record.
    ///
    /// A partial note with no fetched content projects an empty body; callers
    /// that need the real body fetch it first.
    pub fn from_compact(note: &CompactNote) -> Self {
        Self {
            id: Some(note.id().to_string()),
            title: note.title().to_string(),
            tags: tags_to_text(note.tags()),
            body: note.content().unwrap_or_default().to_string(),
            is_public: note.is_public(),
            format: note.format().clone(),
        }
    }

    /// Parsed tag list of the working copy.
    pub fn tag_list(&self) -> Vec<String> {
        text_to_tags(&self.tags)
    }

    /// Builds the object the persistence capability receives.
    pub fn to_save_payload(&self) -> SaveNotePayload {
        SaveNotePayload {
            hash_id: self.id.clone(),
            title: self.title.clone(),
            tags: self.tag_list(),
            content: self.body.trim().to_string(),
            format: self.format.as_str().to_string(),
            is_public: self.is_public,
        }
    }

    /// Serializes the save payload as JSON text.
    pub fn serialize_for_save(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_save_payload())
    }
}

impl Default for EditableNote {
    fn default() -> Self {
        Self::empty()
    }
}

/// JSON body for create/update note requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveNotePayload {
    #[serde(rename = "HashID", skip_serializing_if = "Option::is_none")]
    pub hash_id: Option<String>,
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub format: String,
    pub is_public: bool,
}

/// Reports whether `current` differs from the `original` snapshot.
///
/// Compares title, tags (as an order-insensitive set) and body.
pub fn has_changed(original: &EditableNote, current: &EditableNote) -> bool {
    if original.title != current.title {
        return true;
    }
    if original.body != current.body {
        return true;
    }
    !tags_eq(&original.tag_list(), &current.tag_list())
}

/// Joins tags as `#a #b`.
pub fn tags_to_text(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits `#a #b` text into tags, trimming each and dropping empty ones.
pub fn text_to_tags(text: &str) -> Vec<String> {
    text.split('#')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{has_changed, tags_to_text, text_to_tags, EditableNote};

    #[test]
    fn tag_text_round_trip_keeps_order() {
        let tags = vec!["work".to_string(), "todo".to_string()];
        let text = tags_to_text(&tags);
        assert_eq!(text, "#work #todo");
        assert_eq!(text_to_tags(&text), tags);
    }

    #[test]
    fn text_to_tags_discards_empty_tags() {
        assert!(text_to_tags("").is_empty());
        assert!(text_to_tags("  #  # ").is_empty());
        assert_eq!(text_to_tags("# #x ##y "), vec!["x", "y"]);
    }

    #[test]
    fn tag_reordering_is_not_a_change() {
        let original = EditableNote {
            tags: "#a #b".to_string(),
            ..EditableNote::empty()
        };
        let current = EditableNote {
            tags: "#b   #a".to_string(),
            ..EditableNote::empty()
        };
        assert!(!has_changed(&original, &current));
    }

    #[test]
    fn payload_trims_content_and_omits_missing_id() {
        let note = EditableNote {
            body: "  hello \n".to_string(),
            tags: "#x".to_string(),
            ..EditableNote::empty()
        };
        let json: serde_json::Value =
            serde_json::from_str(&note.serialize_for_save().expect("payload serializes"))
                .expect("payload is valid JSON");
        assert_eq!(json["Content"], "hello");
        assert_eq!(json["Tags"], serde_json::json!(["x"]));
        assert_eq!(json["Format"], "markdown");
        assert_eq!(json["IsPublic"], false);
        assert!(json.get("HashID").is_none());
    }
}
