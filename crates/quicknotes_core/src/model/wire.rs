//! Positional wire encoding for compact notes.
//!
//! # Responsibility
//! - Decode the server's ordered array form into `CompactNote`.
//! - Encode `CompactNote` back into the same array form.
//! - Isolate malformed records so one bad note never fails a whole list.
//!
//! # Invariants
//! - Field order is fixed: id, title, size, flags, created_at, tags, snippet,
//!   format, current_version_id, content.
//! - Required scalars are never defaulted; a missing or mistyped one is a
//!   `MalformedRecordError`.
//! - A trailing content slot may be `null` or omitted only for partial notes.

use crate::model::compact_note::{CompactNote, NoteFormat};
use crate::model::flags::{NoteFlag, NoteFlags};
use log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of positional slots in a full record.
pub const COMPACT_NOTE_FIELDS: usize = 10;

const IDX_ID: usize = 0;
const IDX_TITLE: usize = 1;
const IDX_SIZE: usize = 2;
const IDX_FLAGS: usize = 3;
const IDX_CREATED_AT: usize = 4;
const IDX_TAGS: usize = 5;
const IDX_SNIPPET: usize = 6;
const IDX_FORMAT: usize = 7;
const IDX_CURRENT_VERSION_ID: usize = 8;
const IDX_CONTENT: usize = 9;

/// Structural decode failure for one compact record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecordError {
    /// Top-level value is not a JSON array.
    NotAnArray,
    /// Array has the wrong number of slots.
    WrongLength { actual: usize },
    /// A slot is missing or has an unexpected JSON type.
    InvalidField {
        field: &'static str,
        index: usize,
        expected: &'static str,
    },
    /// Non-partial note delivered without its body.
    MissingContent { id: String },
}

impl Display for MalformedRecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnArray => write!(f, "compact note must be a JSON array"),
            Self::WrongLength { actual } => write!(
                f,
                "compact note must have {COMPACT_NOTE_FIELDS} fields, got {actual}"
            ),
            Self::InvalidField {
                field,
                index,
                expected,
            } => write!(
                f,
                "compact note field `{field}` (index {index}) must be {expected}"
            ),
            Self::MissingContent { id } => {
                write!(f, "note {id} is not partial but has no content")
            }
        }
    }
}

impl Error for MalformedRecordError {}

impl CompactNote {
    /// Decodes one positional record.
    ///
    /// # Errors
    /// - Returns `MalformedRecordError` when the shape or any required field
    ///   is wrong. Nothing is guessed.
    pub fn from_wire(value: &Value) -> Result<Self, MalformedRecordError> {
        let slots = value.as_array().ok_or(MalformedRecordError::NotAnArray)?;
        let len = slots.len();
        if len != COMPACT_NOTE_FIELDS && len != COMPACT_NOTE_FIELDS - 1 {
            return Err(MalformedRecordError::WrongLength { actual: len });
        }

        let id = string_at(slots, IDX_ID, "id")?;
        let title = string_at(slots, IDX_TITLE, "title")?;
        let size = slots[IDX_SIZE].as_u64().ok_or(invalid(
            "size",
            IDX_SIZE,
            "a non-negative integer",
        ))?;
        let flags = slots[IDX_FLAGS]
            .as_u64()
            .and_then(|bits| u32::try_from(bits).ok())
            .map(NoteFlags::from_bits)
            .ok_or(invalid("flags", IDX_FLAGS, "a 32-bit unsigned integer"))?;
        let created_at = slots[IDX_CREATED_AT].as_i64().ok_or(invalid(
            "created_at",
            IDX_CREATED_AT,
            "an integer timestamp",
        ))?;
        let tags = tags_at(slots)?;
        let snippet = string_at(slots, IDX_SNIPPET, "snippet")?;
        let format = NoteFormat::parse(&string_at(slots, IDX_FORMAT, "format")?);
        let current_version_id = string_at(slots, IDX_CURRENT_VERSION_ID, "current_version_id")?;
        let content = match slots.get(IDX_CONTENT) {
            None | Some(Value::Null) => None,
            Some(Value::String(body)) => Some(body.clone()),
            Some(_) => {
                return Err(invalid("content", IDX_CONTENT, "a string or null"));
            }
        };

        let partial = flags.is_set(NoteFlag::Partial);
        match content.as_deref() {
            None if !partial => return Err(MalformedRecordError::MissingContent { id }),
            Some(body) if !partial && body.len() as u64 != size => {
                warn!(
                    "event=note_decode module=wire status=size_mismatch note_id={} size={} content_len={}",
                    id,
                    size,
                    body.len()
                );
            }
            _ => {}
        }

        Ok(Self {
            id,
            title,
            size,
            flags,
            created_at,
            tags,
            snippet,
            format,
            current_version_id,
            content,
        })
    }

    /// Encodes this note as a 10-slot positional array.
    pub fn to_wire(&self) -> Value {
        Value::Array(vec![
            Value::from(self.id.as_str()),
            Value::from(self.title.as_str()),
            Value::from(self.size),
            Value::from(self.flags.bits()),
            Value::from(self.created_at),
            match &self.tags {
                Some(tags) => Value::from(tags.clone()),
                None => Value::Null,
            },
            Value::from(self.snippet.as_str()),
            Value::from(self.format.as_str()),
            Value::from(self.current_version_id.as_str()),
            match &self.content {
                Some(body) => Value::from(body.as_str()),
                None => Value::Null,
            },
        ])
    }
}

impl Serialize for CompactNote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CompactNote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CompactNote::from_wire(&value).map_err(D::Error::custom)
    }
}

/// Decodes a list response, one result per record.
///
/// A non-array top-level value yields a single `NotAnArray` entry so callers
/// always get something to report.
pub fn decode_note_list(value: &Value) -> Vec<Result<CompactNote, MalformedRecordError>> {
    let Some(records) = value.as_array() else {
        return vec![Err(MalformedRecordError::NotAnArray)];
    };

    records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            let decoded = CompactNote::from_wire(record);
            if let Err(err) = &decoded {
                warn!(
                    "event=note_decode module=wire status=error position={} error={}",
                    position, err
                );
            }
            decoded
        })
        .collect()
}

fn invalid(field: &'static str, index: usize, expected: &'static str) -> MalformedRecordError {
    MalformedRecordError::InvalidField {
        field,
        index,
        expected,
    }
}

fn string_at(
    slots: &[Value],
    index: usize,
    field: &'static str,
) -> Result<String, MalformedRecordError> {
    slots[index]
        .as_str()
        .map(str::to_string)
        .ok_or(invalid(field, index, "a string"))
}

fn tags_at(slots: &[Value]) -> Result<Option<Vec<String>>, MalformedRecordError> {
    let expected = "null or an array of strings";
    match &slots[IDX_TAGS] {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(invalid("tags", IDX_TAGS, expected))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        _ => Err(invalid("tags", IDX_TAGS, expected)),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_note_list, MalformedRecordError};
    use crate::model::compact_note::{CompactNote, NoteFormat};
    use serde_json::json;

    #[test]
    fn decodes_partial_note_without_content_slot() {
        let value = json!(["abc123", "My Note", 500, 8, 1000, ["x", "y"], "prev...", "markdown", "v1"]);
        let note = CompactNote::from_wire(&value).expect("nine-slot partial should decode");
        assert!(note.is_partial());
        assert_eq!(note.content(), None);
        assert_eq!(note.format(), &NoteFormat::Markdown);
    }

    #[test]
    fn rejects_non_partial_note_without_content() {
        let value = json!(["abc", "", 3, 0, 1, null, "abc", "text", "v1", null]);
        let err = CompactNote::from_wire(&value).expect_err("missing body must fail");
        assert_eq!(
            err,
            MalformedRecordError::MissingContent {
                id: "abc".to_string()
            }
        );
    }

    #[test]
    fn reports_the_offending_field() {
        let value = json!(["abc", null, 3, 0, 1, null, "abc", "text", "v1", "abc"]);
        let err = CompactNote::from_wire(&value).expect_err("null title must fail");
        assert!(matches!(
            err,
            MalformedRecordError::InvalidField { field: "title", index: 1, .. }
        ));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn rejects_flags_wider_than_32_bits() {
        let value = json!(["abc", "", 3, 4_294_967_296_u64, 1, null, "abc", "text", "v1", "abc"]);
        let err = CompactNote::from_wire(&value).expect_err("oversized flags must fail");
        assert!(matches!(
            err,
            MalformedRecordError::InvalidField { field: "flags", .. }
        ));
    }

    #[test]
    fn list_decoding_isolates_bad_records() {
        let value = json!([
            ["a", "A", 1, 0, 1, [], "a", "text", "v1", "a"],
            "not a note",
            ["c", "C", 1, 8, 1, null, "c", "markdown", "v1", null]
        ]);
        let results = decode_note_list(&value);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(MalformedRecordError::NotAnArray));
        assert!(results[2].is_ok());
    }

    #[test]
    fn wire_form_keeps_field_order() {
        let note = CompactNote::new("id1", "T", "body", NoteFormat::Text, "v9", 77);
        assert_eq!(
            note.to_wire(),
            json!(["id1", "T", 4, 0, 77, null, "body", "text", "v9", "body"])
        );
    }
}
