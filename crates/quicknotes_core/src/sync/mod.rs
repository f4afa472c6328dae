//! Lazy note content synchronization.
//!
//! # Responsibility
//! - Define the capabilities the host injects (fetch, save, render).
//! - Drive the collapse/expand lifecycle of partial notes.

pub mod capability;
pub mod controller;
