//! Injected capabilities the core calls out to.
//!
//! The core performs no I/O of its own. Network fetch/save and markdown
//! rendering are supplied by the host through these traits.
//!
//! Futures are `?Send`: the client runs on one cooperative thread.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Retrieves the full body of a partial note.
#[async_trait(?Send)]
pub trait ContentFetcher {
    async fn fetch_content(&self, note_id: &str, version_id: &str) -> Result<String, FetchError>;
}

/// Persists a serialized editable note.
#[async_trait(?Send)]
pub trait NoteSaver {
    async fn save_note(&self, payload: &str) -> Result<SaveAck, SaveError>;
}

/// Pure markdown-to-HTML renderer, including link sanitization.
pub trait MarkdownRenderer {
    fn render_markdown(&self, text: &str) -> String;
}

/// Server acknowledgement of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAck {
    /// Id assigned or confirmed by the server.
    pub note_id: String,
}

/// Content retrieval failed. Recoverable: the user may expand again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub note_id: String,
    pub version_id: String,
    pub message: String,
}

impl FetchError {
    pub fn new(
        note_id: impl Into<String>,
        version_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            note_id: note_id.into(),
            version_id: version_id.into(),
            message: message.into(),
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to fetch content of note {} (version {}): {}",
            self.note_id, self.version_id, self.message
        )
    }
}

impl Error for FetchError {}

/// Persistence failed. The edit session stays open for a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// Working copy could not be serialized.
    Serialize(String),
    /// Transport or server failure.
    Transport(String),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(message) => write!(f, "failed to serialize note: {message}"),
            Self::Transport(message) => write!(f, "failed to save note: {message}"),
        }
    }
}

impl Error for SaveError {}

impl From<serde_json::Error> for SaveError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
