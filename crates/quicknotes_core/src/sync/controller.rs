//! Lazy content synchronization for displayed notes.
//!
//! # Responsibility
//! - Track the collapsed/expanding/expanded display state of every note in a
//!   list view.
//! - Fetch the full body of partial notes on demand, at most once per note
//!   version.
//!
//! # Invariants
//! - At most one fetch per note id is outstanding at any time, including
//!   across reloads that deliver the same version again.
//! - "Content cached" is tracked by the `Partial` flag, independently of the
//!   display state; collapsing never drops content.
//! - A successful fetch always hydrates the note, but only moves the display
//!   to `Expanded` if the note is still `Expanding`.
//! - A failed fetch leaves the note partial and collapsed.
//! - `RefCell` borrows are never held across an `.await`.

use crate::model::compact_note::CompactNote;
use crate::sync::capability::{ContentFetcher, FetchError};
use futures::future::join_all;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display state of one note body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Snippet is shown.
    Collapsed,
    /// Snippet is shown while the full body is being fetched.
    Expanding,
    /// Full body is shown.
    Expanded,
}

impl DisplayState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collapsed => "collapsed",
            Self::Expanding => "expanding",
            Self::Expanded => "expanded",
        }
    }
}

/// Result of one `expand` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// Content was fetched and the note is now expanded.
    Fetched,
    /// Content was fetched, but the note was collapsed meanwhile.
    FetchedWhileCollapsed,
    /// Content was already cached; expanded without a fetch.
    Cached,
    /// Nothing to do.
    AlreadyExpanded,
    /// A fetch for this note is already outstanding.
    AlreadyPending,
    /// The note was replaced or removed while the fetch was in flight; the
    /// result was dropped.
    Stale,
}

/// Controller errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    UnknownNote(String),
    Fetch(FetchError),
    /// Another fetch for this note is still outstanding.
    FetchPending(String),
    /// The note was replaced by a newer record before the fetch finished.
    Superseded(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNote(id) => write!(f, "note not tracked: {id}"),
            Self::Fetch(err) => write!(f, "{err}"),
            Self::FetchPending(id) => write!(f, "content fetch already pending for note {id}"),
            Self::Superseded(id) => write!(f, "note {id} was superseded during fetch"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FetchError> for SyncError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

/// One note as displayed by the list.
#[derive(Debug, Clone)]
pub struct NoteView {
    note: CompactNote,
    display: DisplayState,
    fetch_in_flight: bool,
    generation: u64,
}

struct FetchTicket {
    note_id: String,
    version_id: String,
    generation: u64,
}

enum ExpandStep {
    Done(ExpandOutcome),
    Fetch(FetchTicket),
}

impl NoteView {
    fn new(note: CompactNote, generation: u64) -> Self {
        let display = if note.is_partial() && note.content().is_none() {
            DisplayState::Collapsed
        } else {
            DisplayState::Expanded
        };
        Self {
            note,
            display,
            fetch_in_flight: false,
            generation,
        }
    }

    /// Same version delivered again: take the new record, keep local state.
    ///
    /// Content already fetched for this version is carried over so a
    /// re-sent partial record does not lose it.
    fn refreshed(self, mut note: CompactNote) -> Self {
        if note.is_partial() && self.is_content_cached() {
            if let Some(content) = self.note.content {
                note.hydrate(content);
            }
        }
        Self { note, ..self }
    }

    pub fn note(&self) -> &CompactNote {
        &self.note
    }

    pub fn display_state(&self) -> DisplayState {
        self.display
    }

    /// Full content is present and no fetch is needed.
    pub fn is_content_cached(&self) -> bool {
        !self.note.is_partial()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Text to render right now. Never waits for a fetch.
    pub fn visible_body(&self) -> &str {
        match self.display {
            DisplayState::Collapsed | DisplayState::Expanding => self.note.snippet(),
            DisplayState::Expanded => self.note.content().unwrap_or(self.note.snippet()),
        }
    }

    fn ticket(&mut self) -> FetchTicket {
        self.fetch_in_flight = true;
        FetchTicket {
            note_id: self.note.id().to_string(),
            version_id: self.note.current_version_id().to_string(),
            generation: self.generation,
        }
    }

    fn begin_expand(&mut self) -> ExpandStep {
        match self.display {
            DisplayState::Expanded => ExpandStep::Done(ExpandOutcome::AlreadyExpanded),
            DisplayState::Expanding => ExpandStep::Done(ExpandOutcome::AlreadyPending),
            DisplayState::Collapsed if self.is_content_cached() => {
                self.display = DisplayState::Expanded;
                ExpandStep::Done(ExpandOutcome::Cached)
            }
            DisplayState::Collapsed if self.fetch_in_flight => {
                // Re-expanded while an earlier fetch is still running; that
                // fetch will complete the transition.
                self.display = DisplayState::Expanding;
                ExpandStep::Done(ExpandOutcome::AlreadyPending)
            }
            DisplayState::Collapsed => {
                self.display = DisplayState::Expanding;
                ExpandStep::Fetch(self.ticket())
            }
        }
    }

    fn finish_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<String, FetchError>,
    ) -> Result<ExpandOutcome, SyncError> {
        if ticket.generation != self.generation {
            return Ok(ExpandOutcome::Stale);
        }
        self.fetch_in_flight = false;

        match result {
            Ok(content) => {
                self.note.hydrate(content);
                if self.display == DisplayState::Expanding {
                    self.display = DisplayState::Expanded;
                    Ok(ExpandOutcome::Fetched)
                } else {
                    Ok(ExpandOutcome::FetchedWhileCollapsed)
                }
            }
            Err(err) => {
                if self.display == DisplayState::Expanding {
                    self.display = DisplayState::Collapsed;
                }
                Err(SyncError::Fetch(err))
            }
        }
    }
}

/// Owns the displayed notes of one list view and their lazy-load state.
pub struct NoteSyncController<F: ContentFetcher> {
    fetcher: F,
    views: RefCell<BTreeMap<String, NoteView>>,
    next_generation: Cell<u64>,
}

impl<F: ContentFetcher> NoteSyncController<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            views: RefCell::new(BTreeMap::new()),
            next_generation: Cell::new(0),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Tracks `note`, replacing any record with the same id.
    ///
    /// Returns `true` when an existing record was superseded. A replacement
    /// with the same `current_version_id` keeps the view's display and fetch
    /// state, so a fetch already running for that version still applies. A
    /// different version starts a fresh view and any running fetch becomes
    /// stale.
    pub fn insert(&self, note: CompactNote) -> bool {
        let mut views = self.views.borrow_mut();
        let previous = views.remove(note.id());
        let superseded = previous.is_some();
        self.track(&mut views, note, previous);
        superseded
    }

    /// Replaces the whole list, e.g. after a reload.
    ///
    /// Notes missing from `notes` stop being tracked. Notes delivered again
    /// at the same version keep their state, as with [`Self::insert`].
    pub fn replace_all(&self, notes: impl IntoIterator<Item = CompactNote>) {
        let mut views = self.views.borrow_mut();
        let mut previous = std::mem::take(&mut *views);
        for note in notes {
            let old = previous.remove(note.id());
            self.track(&mut views, note, old);
        }
    }

    fn track(
        &self,
        views: &mut BTreeMap<String, NoteView>,
        note: CompactNote,
        previous: Option<NoteView>,
    ) {
        let id = note.id().to_string();
        let view = match previous {
            Some(old) if old.note.current_version_id() == note.current_version_id() => {
                old.refreshed(note)
            }
            _ => {
                let generation = self.next_generation.get();
                self.next_generation.set(generation + 1);
                NoteView::new(note, generation)
            }
        };
        debug!(
            "event=note_track module=sync status=ok note_id={} display={} fetch_in_flight={}",
            id,
            view.display.as_str(),
            view.fetch_in_flight
        );
        views.insert(id, view);
    }

    /// Stops tracking a note. A fetch still running for it becomes stale.
    pub fn remove(&self, note_id: &str) -> Option<CompactNote> {
        self.views
            .borrow_mut()
            .remove(note_id)
            .map(|view| view.note)
    }

    pub fn len(&self) -> usize {
        self.views.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.borrow().is_empty()
    }

    /// Tracked note ids in ascending order.
    pub fn note_ids(&self) -> Vec<String> {
        self.views.borrow().keys().cloned().collect()
    }

    /// Snapshot of one note record.
    pub fn note(&self, note_id: &str) -> Option<CompactNote> {
        self.views
            .borrow()
            .get(note_id)
            .map(|view| view.note.clone())
    }

    /// Snapshot of one note view.
    pub fn view(&self, note_id: &str) -> Option<NoteView> {
        self.views.borrow().get(note_id).cloned()
    }

    pub fn display_state(&self, note_id: &str) -> Option<DisplayState> {
        self.views.borrow().get(note_id).map(|view| view.display)
    }

    pub fn visible_body(&self, note_id: &str) -> Option<String> {
        self.views
            .borrow()
            .get(note_id)
            .map(|view| view.visible_body().to_string())
    }

    /// Runs `apply` against the owned record, e.g. for flag toggles.
    ///
    /// The public flag setters ignore `Partial`, so the closure cannot mark
    /// an unfetched note as cached.
    pub fn with_note_mut<R>(
        &self,
        note_id: &str,
        apply: impl FnOnce(&mut CompactNote) -> R,
    ) -> Result<R, SyncError> {
        let mut views = self.views.borrow_mut();
        let view = views
            .get_mut(note_id)
            .ok_or_else(|| SyncError::UnknownNote(note_id.to_string()))?;
        Ok(apply(&mut view.note))
    }

    /// Handles the user's "Expand" action.
    ///
    /// # Errors
    /// - `UnknownNote` when the id is not tracked.
    /// - `Fetch` when content retrieval failed; the note stays collapsed and
    ///   partial, and the caller may retry.
    pub async fn expand(&self, note_id: &str) -> Result<ExpandOutcome, SyncError> {
        let ticket = {
            let mut views = self.views.borrow_mut();
            let view = views
                .get_mut(note_id)
                .ok_or_else(|| SyncError::UnknownNote(note_id.to_string()))?;
            match view.begin_expand() {
                ExpandStep::Done(outcome) => {
                    debug!(
                        "event=note_expand module=sync status=noop note_id={} outcome={:?}",
                        note_id, outcome
                    );
                    return Ok(outcome);
                }
                ExpandStep::Fetch(ticket) => ticket,
            }
        };

        let outcome = self.run_fetch(&ticket).await?;
        info!(
            "event=note_expand module=sync status=ok note_id={} version_id={} outcome={:?}",
            ticket.note_id, ticket.version_id, outcome
        );
        Ok(outcome)
    }

    /// Expands several notes concurrently. Results follow the input order.
    pub async fn expand_all(&self, note_ids: &[&str]) -> Vec<Result<ExpandOutcome, SyncError>> {
        join_all(note_ids.iter().map(|note_id| self.expand(note_id))).await
    }

    /// Handles the user's "Collapse" action. Cached content is kept.
    ///
    /// Returns the state the note was in before collapsing.
    pub fn collapse(&self, note_id: &str) -> Result<DisplayState, SyncError> {
        let mut views = self.views.borrow_mut();
        let view = views
            .get_mut(note_id)
            .ok_or_else(|| SyncError::UnknownNote(note_id.to_string()))?;
        let previous = view.display;
        view.display = DisplayState::Collapsed;
        debug!(
            "event=note_collapse module=sync status=ok note_id={} previous={}",
            note_id,
            previous.as_str()
        );
        Ok(previous)
    }

    /// Returns the note with full content, fetching it if needed.
    ///
    /// Display state is left alone. Used by the editor, which needs the full
    /// body before a session can start.
    pub async fn ensure_content(&self, note_id: &str) -> Result<CompactNote, SyncError> {
        let ticket = {
            let mut views = self.views.borrow_mut();
            let view = views
                .get_mut(note_id)
                .ok_or_else(|| SyncError::UnknownNote(note_id.to_string()))?;
            if view.is_content_cached() {
                return Ok(view.note.clone());
            }
            if view.fetch_in_flight {
                return Err(SyncError::FetchPending(note_id.to_string()));
            }
            view.ticket()
        };

        match self.run_fetch(&ticket).await? {
            ExpandOutcome::Stale => Err(SyncError::Superseded(note_id.to_string())),
            _ => self
                .note(note_id)
                .ok_or_else(|| SyncError::UnknownNote(note_id.to_string())),
        }
    }

    async fn run_fetch(&self, ticket: &FetchTicket) -> Result<ExpandOutcome, SyncError> {
        info!(
            "event=content_fetch module=sync status=start note_id={} version_id={}",
            ticket.note_id, ticket.version_id
        );
        let result = self
            .fetcher
            .fetch_content(&ticket.note_id, &ticket.version_id)
            .await;

        let mut views = self.views.borrow_mut();
        let Some(view) = views.get_mut(&ticket.note_id) else {
            warn!(
                "event=content_fetch module=sync status=stale note_id={} reason=removed",
                ticket.note_id
            );
            return Ok(ExpandOutcome::Stale);
        };
        let outcome = view.finish_fetch(ticket, result);
        match &outcome {
            Ok(ExpandOutcome::Stale) => warn!(
                "event=content_fetch module=sync status=stale note_id={} reason=superseded",
                ticket.note_id
            ),
            Ok(_) => {}
            Err(err) => warn!(
                "event=content_fetch module=sync status=error note_id={} error={}",
                ticket.note_id, err
            ),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayState, NoteView};
    use crate::model::compact_note::{CompactNote, NoteFormat};
    use crate::model::flags::NoteFlag;

    fn partial_note(content: Option<&str>) -> CompactNote {
        let mut note = CompactNote::new("n1", "T", "teaser", NoteFormat::Text, "v1", 0);
        note.flags.set(NoteFlag::Partial);
        note.content = content.map(str::to_string);
        note
    }

    #[test]
    fn partial_note_without_content_starts_collapsed() {
        let view = NoteView::new(partial_note(None), 0);
        assert_eq!(view.display_state(), DisplayState::Collapsed);
        assert!(!view.is_content_cached());
        assert_eq!(view.visible_body(), "teaser");
    }

    #[test]
    fn partial_note_with_teaser_starts_expanded_but_uncached() {
        let view = NoteView::new(partial_note(Some("tea")), 0);
        assert_eq!(view.display_state(), DisplayState::Expanded);
        assert!(!view.is_content_cached());
        assert_eq!(view.visible_body(), "tea");
    }

    #[test]
    fn full_note_starts_expanded() {
        let note = CompactNote::new("n2", "", "body", NoteFormat::Markdown, "v1", 0);
        let view = NoteView::new(note, 0);
        assert_eq!(view.display_state(), DisplayState::Expanded);
        assert_eq!(view.visible_body(), "body");
    }
}
