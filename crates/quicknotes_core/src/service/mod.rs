//! Client use-case services.
//!
//! # Responsibility
//! - Orchestrate model and sync calls into UI-level actions.
//! - Keep presentation code decoupled from flag bits and fetch plumbing.

pub mod editor;
pub mod note_actions;
