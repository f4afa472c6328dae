//! Note editor session.
//!
//! # Responsibility
//! - Start edit sessions for existing or new notes with a deep snapshot of
//!   the original.
//! - Gate saving on the dirty-check and hand the payload to the injected
//!   persistence capability.
//!
//! # Invariants
//! - Save is only attempted when the working copy differs from the snapshot.
//! - A failed save leaves the session open and the working copy untouched.
//! - Discard abandons the edit: the working copy becomes a fresh empty note.
//!   It does not revert to the snapshot.
//! - A dirty session is never replaced by a new one.

use crate::model::compact_note::CompactNote;
use crate::model::editable_note::{has_changed, EditableNote};
use crate::sync::capability::{ContentFetcher, MarkdownRenderer, NoteSaver, SaveAck, SaveError};
use crate::sync::controller::{NoteSyncController, SyncError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors when opening an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Another session with unsaved changes is open.
    SessionBusy { note_id: Option<String> },
    /// Full content for the note could not be loaded.
    Sync(SyncError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionBusy { note_id } => write!(
                f,
                "editor has unsaved changes for note {}",
                note_id.as_deref().unwrap_or("<new>")
            ),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sync(err) => Some(err),
            Self::SessionBusy { .. } => None,
        }
    }
}

impl From<SyncError> for EditorError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

/// Outcome of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SaveAck),
    /// Nothing changed; the saver was not called.
    Unchanged,
}

/// Single editor session owner.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    is_showing: bool,
    original: Option<EditableNote>,
    note: EditableNote,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_showing(&self) -> bool {
        self.is_showing
    }

    /// Live working copy.
    pub fn note(&self) -> &EditableNote {
        &self.note
    }

    /// Snapshot taken when the session started.
    pub fn original(&self) -> Option<&EditableNote> {
        self.original.as_ref()
    }

    /// Opens a session on `note`, snapshotting it as the original.
    pub fn start_editing(&mut self, note: EditableNote) -> Result<(), EditorError> {
        self.ensure_not_busy()?;
        info!(
            "event=edit_start module=editor status=ok note_id={}",
            note.id.as_deref().unwrap_or("<new>")
        );
        self.original = Some(note.clone());
        self.note = note;
        self.is_showing = true;
        Ok(())
    }

    /// Opens a session on a listed note, fetching its full body first if the
    /// note is still partial.
    pub async fn edit_note<F: ContentFetcher>(
        &mut self,
        note_id: &str,
        controller: &NoteSyncController<F>,
    ) -> Result<(), EditorError> {
        self.ensure_not_busy()?;
        let compact = controller.ensure_content(note_id).await?;
        self.edit_compact(&compact)
    }

    /// Opens a session on an already hydrated compact note.
    pub fn edit_compact(&mut self, note: &CompactNote) -> Result<(), EditorError> {
        self.start_editing(EditableNote::from_compact(note))
    }

    /// Opens a session on a new, empty note.
    pub fn create_new_note(&mut self) -> Result<(), EditorError> {
        self.start_editing(EditableNote::empty())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.note.title = title.into();
    }

    /// Sets the raw `#tag #tag` text.
    pub fn set_tags_text(&mut self, tags: impl Into<String>) {
        self.note.tags = tags.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.note.body = body.into();
    }

    pub fn set_public(&mut self, is_public: bool) {
        self.note.is_public = is_public;
    }

    /// Dirty-check against the session snapshot.
    pub fn has_changed(&self) -> bool {
        self.original
            .as_ref()
            .is_some_and(|original| has_changed(original, &self.note))
    }

    pub fn save_enabled(&self) -> bool {
        self.is_showing && self.has_changed()
    }

    /// Abandons the session and resets to an empty note.
    pub fn discard(&mut self) {
        info!(
            "event=edit_discard module=editor status=ok note_id={} dirty={}",
            self.note.id.as_deref().unwrap_or("<new>"),
            self.has_changed()
        );
        self.close();
    }

    /// Saves the working copy if it changed.
    ///
    /// # Errors
    /// - `SaveError` from serialization or the saver. The session stays open.
    pub async fn save<S: NoteSaver>(&mut self, saver: &S) -> Result<SaveOutcome, SaveError> {
        if !self.save_enabled() {
            return Ok(SaveOutcome::Unchanged);
        }

        let payload = self.note.serialize_for_save()?;
        match saver.save_note(&payload).await {
            Ok(ack) => {
                info!(
                    "event=note_save module=editor status=ok note_id={}",
                    ack.note_id
                );
                self.close();
                Ok(SaveOutcome::Saved(ack))
            }
            Err(err) => {
                warn!(
                    "event=note_save module=editor status=error note_id={} error={}",
                    self.note.id.as_deref().unwrap_or("<new>"),
                    err
                );
                Err(err)
            }
        }
    }

    /// Renders the trimmed body through the injected renderer.
    pub fn preview_html<R: MarkdownRenderer>(&self, renderer: &R) -> String {
        renderer.render_markdown(self.note.body.trim())
    }

    fn ensure_not_busy(&self) -> Result<(), EditorError> {
        if self.is_showing && self.has_changed() {
            return Err(EditorError::SessionBusy {
                note_id: self.note.id.clone(),
            });
        }
        Ok(())
    }

    fn close(&mut self) {
        self.is_showing = false;
        self.original = None;
        self.note = EditableNote::empty();
    }
}
