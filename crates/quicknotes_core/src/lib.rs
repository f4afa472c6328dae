//! Core data model and lazy synchronization for the QuickNotes client.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod sync;

pub use config::{ClientConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::compact_note::{notes_eq, tags_eq, CompactNote, NoteFormat};
pub use model::editable_note::{
    has_changed, tags_to_text, text_to_tags, EditableNote, SaveNotePayload,
};
pub use model::flags::{NoteFlag, NoteFlags};
pub use model::wire::{decode_note_list, MalformedRecordError, COMPACT_NOTE_FIELDS};
pub use service::editor::{Editor, EditorError, SaveOutcome};
pub use service::note_actions::{
    available_actions, toggle_deleted, toggle_public, toggle_starred, urlify_title, view_url,
    NoteAction,
};
pub use sync::capability::{
    ContentFetcher, FetchError, MarkdownRenderer, NoteSaver, SaveAck, SaveError,
};
pub use sync::controller::{DisplayState, ExpandOutcome, NoteSyncController, NoteView, SyncError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
