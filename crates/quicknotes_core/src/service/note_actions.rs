//! Note list actions.
//!
//! # Responsibility
//! - Decide which actions a note offers to its viewer.
//! - Apply star/trash/public toggles as explicit read-then-set updates.
//! - Build public view links.
//!
//! # Invariants
//! - Toggles are synchronous; the new state is observable when they return.
//! - Deleted notes offer neither edit, star nor public/private actions.

use crate::config::ClientConfig;
use crate::model::compact_note::CompactNote;
use crate::model::flags::NoteFlag;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_ ]+").expect("valid slug char regex"));
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid spaces regex"));

/// User-facing action on a listed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteAction {
    Star,
    Unstar,
    MoveToTrash,
    Undelete,
    DeletePermanently,
    MakePublic,
    MakePrivate,
    Edit,
    View,
}

/// Actions offered for `note`, in display order.
///
/// Non-owners can only open the public view.
pub fn available_actions(note: &CompactNote, is_owner: bool) -> Vec<NoteAction> {
    if !is_owner {
        return vec![NoteAction::View];
    }

    let mut actions = Vec::with_capacity(5);
    if note.is_deleted() {
        actions.push(NoteAction::Undelete);
        actions.push(NoteAction::DeletePermanently);
    } else {
        actions.push(if note.is_starred() {
            NoteAction::Unstar
        } else {
            NoteAction::Star
        });
        actions.push(NoteAction::MoveToTrash);
        actions.push(if note.is_public() {
            NoteAction::MakePrivate
        } else {
            NoteAction::MakePublic
        });
        actions.push(NoteAction::Edit);
    }
    actions.push(NoteAction::View);
    actions
}

/// Flips the starred bit. Returns the new state.
pub fn toggle_starred(note: &mut CompactNote) -> bool {
    toggle(note, NoteFlag::Starred)
}

/// Moves the note to or out of trash. Returns the new deleted state.
pub fn toggle_deleted(note: &mut CompactNote) -> bool {
    toggle(note, NoteFlag::Deleted)
}

/// Makes the note public or private. Returns the new public state.
pub fn toggle_public(note: &mut CompactNote) -> bool {
    toggle(note, NoteFlag::Public)
}

fn toggle(note: &mut CompactNote, flag: NoteFlag) -> bool {
    let next = !note.is_flag_set(flag);
    note.set_flag_state(flag, next);
    info!(
        "event=note_flag module=actions status=ok note_id={} flag={} value={}",
        note.id(),
        flag.as_str(),
        next
    );
    next
}

/// Turns a title into a URL slug: first `max_chars` characters, lowercase,
/// punctuation dropped, space runs replaced by `-`.
pub fn urlify_title(title: &str, max_chars: usize) -> String {
    let head: String = title.chars().take(max_chars).collect();
    let lowered = head.to_lowercase();
    let cleaned = NON_SLUG_CHARS_RE.replace_all(&lowered, "");
    SPACES_RE.replace_all(&cleaned, "-").into_owned()
}

/// Public view link: `<prefix><id>` plus `-<slug>` for titled notes.
pub fn view_url(note: &CompactNote, config: &ClientConfig) -> String {
    let mut url = format!("{}{}", config.view_url_prefix, note.id());
    if !note.title().is_empty() {
        url.push('-');
        url.push_str(&urlify_title(note.title(), config.title_slug_max_chars));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::urlify_title;

    #[test]
    fn urlify_drops_punctuation_and_joins_words() {
        assert_eq!(urlify_title("Hello, World!", 32), "hello-world");
        assert_eq!(urlify_title("a   b", 32), "a-b");
    }

    #[test]
    fn urlify_truncates_before_cleaning() {
        assert_eq!(urlify_title("abcdef", 3), "abc");
        assert_eq!(urlify_title("ab!cdef", 3), "ab");
    }

    #[test]
    fn urlify_drops_non_ascii_word_chars() {
        assert_eq!(urlify_title("café notes", 32), "caf-notes");
    }
}
