//! Compact note record.
//!
//! # Responsibility
//! - Give named, typed access to the ten fields the server packs positionally.
//! - Own flag manipulation and note equality.
//!
//! # Invariants
//! - A note without the `Partial` flag always carries `content`.
//! - Only decoding and a completed fetch change `Partial`; the public flag
//!   setters ignore it.
//! - `tags` has set semantics: equality ignores order, absent == empty.
//! - `snippet` is authoritative for previews; content is never truncated here.
//!
//! # See also
//! - `model::wire` for the positional array encoding.

use crate::model::flags::{NoteFlag, NoteFlags};
use log::warn;
use std::fmt::{Display, Formatter};

/// Rendering mode of a note body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum NoteFormat {
    Text,
    #[default]
    Markdown,
    Html,
    /// Format string the client does not know; kept verbatim.
    Other(String),
}

impl NoteFormat {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Parses a wire format string. Never fails; unknown values are preserved.
    pub fn parse(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "markdown" => Self::Markdown,
            "html" => Self::Html,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for NoteFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Note record as delivered by the server's compact list encoding.
///
/// Fields are private: list code reads through accessors and mutates only
/// through the explicit setters below, so the owner of a record is always
/// visible at the call site.
#[derive(Debug, Clone, Eq)]
pub struct CompactNote {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) size: u64,
    pub(crate) flags: NoteFlags,
    pub(crate) created_at: i64,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) snippet: String,
    pub(crate) format: NoteFormat,
    pub(crate) current_version_id: String,
    pub(crate) content: Option<String>,
}

impl CompactNote {
    /// Builds a fully hydrated (non-partial) note.
    ///
    /// `size` is derived from the content byte length.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        format: NoteFormat,
        current_version_id: impl Into<String>,
        created_at: i64,
    ) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            title: title.into(),
            size: content.len() as u64,
            flags: NoteFlags::default(),
            created_at,
            tags: None,
            snippet: content.clone(),
            format,
            current_version_id: current_version_id.into(),
            content: Some(content),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Byte size of the full content, as reported by the server.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn flags(&self) -> NoteFlags {
        self.flags
    }

    /// Creation time in epoch milliseconds.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Tags in server order. Absent tags read as an empty slice.
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn format(&self) -> &NoteFormat {
        &self.format
    }

    pub fn current_version_id(&self) -> &str {
        &self.current_version_id
    }

    /// Full body, or `None` while a partial note has not been fetched.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_flag_set(&self, flag: NoteFlag) -> bool {
        self.flags.is_set(flag)
    }

    /// Sets one flag bit in place. Idempotent.
    ///
    /// `Partial` is owned by the server and the sync controller; requests to
    /// change it are ignored.
    pub fn set_flag(&mut self, flag: NoteFlag) {
        if self.accepts_client_change(flag) {
            self.flags.set(flag);
        }
    }

    /// Clears one flag bit in place. Ignores `Partial`.
    pub fn clear_flag(&mut self, flag: NoteFlag) {
        if self.accepts_client_change(flag) {
            self.flags.clear(flag);
        }
    }

    /// Sets or clears `flag` depending on `on`, without short-circuiting.
    /// Ignores `Partial`.
    pub fn set_flag_state(&mut self, flag: NoteFlag, on: bool) {
        if self.accepts_client_change(flag) {
            self.flags.set_state(flag, on);
        }
    }

    fn accepts_client_change(&self, flag: NoteFlag) -> bool {
        if flag == NoteFlag::Partial {
            warn!(
                "event=note_flag module=model status=rejected note_id={} flag={}",
                self.id,
                flag.as_str()
            );
            return false;
        }
        true
    }

    pub fn is_starred(&self) -> bool {
        self.is_flag_set(NoteFlag::Starred)
    }

    pub fn is_deleted(&self) -> bool {
        self.is_flag_set(NoteFlag::Deleted)
    }

    pub fn is_public(&self) -> bool {
        self.is_flag_set(NoteFlag::Public)
    }

    pub fn is_partial(&self) -> bool {
        self.is_flag_set(NoteFlag::Partial)
    }

    pub fn set_public_state(&mut self, is_public: bool) {
        self.set_flag_state(NoteFlag::Public, is_public);
    }

    pub fn set_starred_state(&mut self, is_starred: bool) {
        self.set_flag_state(NoteFlag::Starred, is_starred);
    }

    pub fn set_deleted_state(&mut self, is_deleted: bool) {
        self.set_flag_state(NoteFlag::Deleted, is_deleted);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = Some(tags);
    }

    pub fn set_format(&mut self, format: NoteFormat) {
        self.format = format;
    }

    /// Replaces the cached body. Does not touch `size` or the flags.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    /// Stores fetched full content and clears `Partial`.
    ///
    /// Only the sync controller calls this, after a successful fetch.
    pub(crate) fn hydrate(&mut self, content: String) {
        self.content = Some(content);
        self.flags.clear(NoteFlag::Partial);
    }

    /// Display string for `size`. Plain byte count, no unit scaling.
    pub fn human_readable_size(&self) -> String {
        format!("{} bytes", self.size)
    }
}

impl PartialEq for CompactNote {
    fn eq(&self, other: &Self) -> bool {
        notes_eq(self, other)
    }
}

/// Field-by-field note equality.
///
/// Scalars (including the whole `flags` integer and `content`) must match
/// exactly; tags are compared as sets.
pub fn notes_eq(a: &CompactNote, b: &CompactNote) -> bool {
    a.id == b.id
        && a.title == b.title
        && a.size == b.size
        && a.flags == b.flags
        && a.created_at == b.created_at
        && a.snippet == b.snippet
        && a.format == b.format
        && a.current_version_id == b.current_version_id
        && a.content == b.content
        && tags_eq(a.tags(), b.tags())
}

/// Order-insensitive tag comparison. Empty and absent are equivalent.
///
/// Both inputs are left untouched; sorting happens on borrowed copies.
pub fn tags_eq(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut left: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut right: Vec<&str> = b.iter().map(String::as_str).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

#[cfg(test)]
mod tests {
    use super::{tags_eq, CompactNote, NoteFormat};
    use crate::model::flags::NoteFlag;

    fn sample() -> CompactNote {
        CompactNote::new("abc", "Title", "hello", NoteFormat::Text, "v1", 10)
    }

    #[test]
    fn new_note_is_hydrated_and_sized_from_content() {
        let note = sample();
        assert!(!note.is_partial());
        assert_eq!(note.content(), Some("hello"));
        assert_eq!(note.size(), 5);
        assert_eq!(note.human_readable_size(), "5 bytes");
    }

    #[test]
    fn format_parse_preserves_unknown_values() {
        assert_eq!(NoteFormat::parse("markdown"), NoteFormat::Markdown);
        assert_eq!(
            NoteFormat::parse("org"),
            NoteFormat::Other("org".to_string())
        );
        assert_eq!(NoteFormat::parse("org").as_str(), "org");
    }

    #[test]
    fn tags_eq_ignores_order_and_does_not_reorder_inputs() {
        let a = vec!["y".to_string(), "x".to_string()];
        let b = vec!["x".to_string(), "y".to_string()];
        assert!(tags_eq(&a, &b));
        assert_eq!(a[0], "y");
        assert!(!tags_eq(&a, &["x".to_string()]));
    }

    #[test]
    fn flag_mismatch_breaks_equality() {
        let a = sample();
        let mut b = sample();
        b.set_flag(NoteFlag::Starred);
        assert_ne!(a, b);
    }

    #[test]
    fn hydrate_clears_partial_and_keeps_size() {
        let mut note = sample();
        note.flags.set(NoteFlag::Partial);
        note.content = None;
        note.hydrate("full content".to_string());
        assert!(!note.is_partial());
        assert_eq!(note.content(), Some("full content"));
        assert_eq!(note.size(), 5);
    }

    #[test]
    fn public_setters_leave_partial_untouched() {
        let mut note = sample();
        note.flags.set(NoteFlag::Partial);
        note.content = None;

        note.clear_flag(NoteFlag::Partial);
        note.set_flag_state(NoteFlag::Partial, false);
        assert!(note.is_partial());

        let mut full = sample();
        full.set_flag(NoteFlag::Partial);
        full.set_flag_state(NoteFlag::Partial, true);
        assert!(!full.is_partial());
        assert_eq!(full.content(), Some("hello"));
    }
}
