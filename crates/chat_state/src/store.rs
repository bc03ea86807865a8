//! Process-wide observable chat state
//!
//! Every mutation runs as one synchronous closure over a watch channel, so it
//! is atomic with respect to other tasks and subscribers see each change.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chat_core::{ChatMessage, Session, User};
use tokio::sync::watch;

use crate::machine::{PipelineState, StateMachine};
use crate::selector::ContextSelector;

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub user: Option<User>,
    /// Set when the backend rejected the credential.
    pub login_required: bool,
    /// Session directory, newest first.
    pub sessions: Vec<Session>,
    /// `None` or the id of an entry in `sessions`.
    pub current_session_id: Option<String>,
    /// Message history per session, in creation order.
    pub histories: HashMap<String, Vec<ChatMessage>>,
    pub selector: ContextSelector,
    /// Text in the input box.
    pub draft: String,
    pub uploading: bool,
    pub pipelines: HashMap<String, StateMachine>,
    /// Bumped on every resolution; survives `reset`.
    pub(crate) revision: u64,
    /// Latest resolutions per session as `(revision, server_id)`.
    pub(crate) resolutions: HashMap<String, VecDeque<(u64, String)>>,
}

/// Resolutions remembered per session for reloads still in flight.
const MAX_REMEMBERED_RESOLUTIONS: usize = 32;

impl ChatState {
    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.session(id))
    }

    pub fn history(&self, session_id: &str) -> &[ChatMessage] {
        self.histories
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Messages of the current session.
    pub fn messages(&self) -> &[ChatMessage] {
        match self.current_session_id.as_deref() {
            Some(id) => self.history(id),
            None => &[],
        }
    }

    pub fn pipeline_state(&self, session_id: &str) -> PipelineState {
        self.pipelines
            .get(session_id)
            .map(|machine| machine.state().clone())
            .unwrap_or_default()
    }

    pub fn is_sending(&self, session_id: &str) -> bool {
        self.pipeline_state(session_id).is_sending()
    }

    pub(crate) fn pipeline_mut(&mut self, session_id: &str) -> &mut StateMachine {
        self.pipelines.entry(session_id.to_string()).or_default()
    }

    /// Record that `server_id` replaced a pending entry in `session_id`.
    pub(crate) fn note_resolution(&mut self, session_id: &str, server_id: &str) {
        self.revision += 1;
        let recent = self.resolutions.entry(session_id.to_string()).or_default();
        recent.push_back((self.revision, server_id.to_string()));
        if recent.len() > MAX_REMEMBERED_RESOLUTIONS {
            recent.pop_front();
        }
    }

    /// Server ids resolved in `session_id` after `revision`.
    pub(crate) fn resolved_after(&self, session_id: &str, revision: u64) -> Vec<&str> {
        self.resolutions
            .get(session_id)
            .into_iter()
            .flatten()
            .filter(|(at, _)| *at > revision)
            .map(|(_, id)| id.as_str())
            .collect()
    }

    /// Forget everything tied to the signed-in user.
    pub(crate) fn reset(&mut self) {
        let revision = self.revision;
        *self = ChatState::default();
        self.revision = revision;
    }
}

#[derive(Debug, Clone)]
pub struct ChatStore {
    tx: Arc<watch::Sender<ChatState>>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ChatState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Apply one atomic mutation and notify subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        let mut result = None;
        self.tx.send_modify(|state| result = Some(f(state)));
        match result {
            Some(result) => result,
            None => unreachable!("send_modify always runs the closure"),
        }
    }

    /// Read without cloning the whole state.
    pub fn read<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn snapshot(&self) -> ChatState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.tx.subscribe()
    }
}
