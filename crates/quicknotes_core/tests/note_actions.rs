mod common;

use common::full_note;
use quicknotes_core::{
    available_actions, toggle_deleted, toggle_starred, view_url, ClientConfig, NoteAction,
};

#[test]
fn owner_sees_full_action_set_for_live_note() {
    let note = full_note("f", "body");
    assert_eq!(
        available_actions(&note, true),
        vec![
            NoteAction::Star,
            NoteAction::MoveToTrash,
            NoteAction::MakePublic,
            NoteAction::Edit,
            NoteAction::View,
        ]
    );
}

#[test]
fn actions_follow_flag_state() {
    let mut note = full_note("f", "body");
    note.set_starred_state(true);
    note.set_public_state(true);
    let actions = available_actions(&note, true);
    assert!(actions.contains(&NoteAction::Unstar));
    assert!(actions.contains(&NoteAction::MakePrivate));
}

#[test]
fn deleted_note_offers_restore_and_permanent_delete_only() {
    let mut note = full_note("f", "body");
    assert!(toggle_deleted(&mut note));
    assert_eq!(
        available_actions(&note, true),
        vec![
            NoteAction::Undelete,
            NoteAction::DeletePermanently,
            NoteAction::View,
        ]
    );

    assert!(!toggle_deleted(&mut note));
    assert!(!note.is_deleted());
}

#[test]
fn non_owner_can_only_view() {
    let note = full_note("f", "body");
    assert_eq!(available_actions(&note, false), vec![NoteAction::View]);
}

#[test]
fn toggle_starred_is_read_then_set() {
    let mut note = full_note("f", "body");
    let before = note.flags().bits();
    assert!(toggle_starred(&mut note));
    assert_eq!(note.flags().bits(), before | 0b0001);
    assert!(!toggle_starred(&mut note));
    assert_eq!(note.flags().bits(), before);
}

#[test]
fn view_url_appends_slug_for_titled_notes() {
    let config = ClientConfig::default();
    let mut note = full_note("abc", "body");
    note.set_title("My First Note!");
    assert_eq!(view_url(&note, &config), "/n/abc-my-first-note");

    note.set_title("");
    assert_eq!(view_url(&note, &config), "/n/abc");
}

#[test]
fn view_url_honours_config() {
    let config = ClientConfig {
        view_url_prefix: "https://notes.example/n/".to_string(),
        title_slug_max_chars: 4,
        ..ClientConfig::default()
    };
    let mut note = full_note("abc", "body");
    note.set_title("Long title here");
    assert_eq!(view_url(&note, &config), "https://notes.example/n/abc-long");
}
