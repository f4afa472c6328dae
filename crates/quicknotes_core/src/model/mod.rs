//! Note data model.
//!
//! # Responsibility
//! - Define the typed compact note record and its flag bitmask.
//! - Own the positional wire boundary and the editor projection.
//!
//! # Invariants
//! - Every note is identified by the server's stable hash id.
//! - `Partial` is server-determined; only a successful fetch clears it.

pub mod compact_note;
pub mod editable_note;
pub mod flags;
pub mod wire;
