#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::oneshot;
use quicknotes_core::{
    CompactNote, ContentFetcher, FetchError, MarkdownRenderer, NoteSaver, SaveAck, SaveError,
};
use serde_json::json;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

type FetchResult = Result<String, FetchError>;

/// Fetcher whose responses are scripted per note id.
///
/// A gated note waits until the test sends through the returned sender, so
/// tests control exactly when each fetch resolves.
#[derive(Default)]
pub struct MockFetcher {
    calls: RefCell<Vec<(String, String)>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<FetchResult>>>,
    responses: RefCell<HashMap<String, VecDeque<FetchResult>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an immediate response for the next fetch of `note_id`.
    pub fn respond(&self, note_id: &str, result: FetchResult) {
        self.responses
            .borrow_mut()
            .entry(note_id.to_string())
            .or_default()
            .push_back(result);
    }

    /// Makes the next fetch of `note_id` wait for the returned sender.
    pub fn gate(&self, note_id: &str) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(note_id.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ContentFetcher for MockFetcher {
    async fn fetch_content(&self, note_id: &str, version_id: &str) -> FetchResult {
        self.calls
            .borrow_mut()
            .push((note_id.to_string(), version_id.to_string()));

        let gate = self.gates.borrow_mut().remove(note_id);
        if let Some(rx) = gate {
            return rx
                .await
                .unwrap_or_else(|_| Err(FetchError::new(note_id, version_id, "gate dropped")));
        }

        let scripted = self
            .responses
            .borrow_mut()
            .get_mut(note_id)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Err(FetchError::new(note_id, version_id, "no response")))
    }
}

/// Saver that records payloads and replays scripted results.
#[derive(Default)]
pub struct MockSaver {
    payloads: RefCell<Vec<String>>,
    results: RefCell<VecDeque<Result<SaveAck, SaveError>>>,
}

impl MockSaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, result: Result<SaveAck, SaveError>) {
        self.results.borrow_mut().push_back(result);
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.borrow().clone()
    }
}

#[async_trait(?Send)]
impl NoteSaver for MockSaver {
    async fn save_note(&self, payload: &str) -> Result<SaveAck, SaveError> {
        self.payloads.borrow_mut().push(payload.to_string());
        let scripted = self.results.borrow_mut().pop_front();
        scripted.unwrap_or_else(|| Err(SaveError::Transport("no response".to_string())))
    }
}

/// Renderer that wraps its input so tests can see what it received.
pub struct EchoRenderer;

impl MarkdownRenderer for EchoRenderer {
    fn render_markdown(&self, text: &str) -> String {
        format!("<p>{text}</p>")
    }
}

/// Partial note from the server: flags = partial, no content.
pub fn partial_note(id: &str, version_id: &str) -> CompactNote {
    CompactNote::from_wire(&json!([
        id,
        "My Note",
        500,
        0b1000,
        1000,
        ["x", "y"],
        "prev...",
        "markdown",
        version_id,
        null
    ]))
    .expect("partial fixture decodes")
}

/// Fully hydrated note from the server.
pub fn full_note(id: &str, content: &str) -> CompactNote {
    CompactNote::from_wire(&json!([
        id,
        "Full",
        content.len(),
        0,
        2000,
        ["b", "a"],
        content,
        "text",
        "v1",
        content
    ]))
    .expect("full fixture decodes")
}
