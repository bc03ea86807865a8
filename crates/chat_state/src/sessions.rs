//! Session directory
//!
//! Create and delete are backend-first: local state only changes after the
//! backend confirms. Selecting is local and reloads the history.

use std::sync::Arc;

use chat_client::{ChatBackend, Page};
use chat_core::{ChatMessage, Session};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{ChatError, Result};
use crate::notice::Notifier;
use crate::store::{ChatState, ChatStore};

#[derive(Clone)]
pub struct SessionDirectory {
    backend: Arc<dyn ChatBackend>,
    store: ChatStore,
    notifier: Notifier,
}

impl SessionDirectory {
    pub fn new(backend: Arc<dyn ChatBackend>, store: ChatStore, notifier: Notifier) -> Self {
        Self {
            backend,
            store,
            notifier,
        }
    }

    /// Refresh the directory. On failure the previous list is kept.
    pub async fn list(&self) -> Result<Vec<Session>> {
        self.list_page(Page::sessions()).await
    }

    pub async fn list_page(&self, page: Page) -> Result<Vec<Session>> {
        match self.backend.list_sessions(page).await {
            Ok(sessions) => {
                debug!("Loaded {} sessions", sessions.len());
                self.store.update(|state| {
                    state.sessions = sessions.clone();
                    let current_gone = state
                        .current_session_id
                        .as_deref()
                        .is_some_and(|id| state.session(id).is_none());
                    if current_gone {
                        state.current_session_id = None;
                    }
                });
                Ok(sessions)
            }
            Err(err) => {
                let err = ChatError::from(err);
                warn!("Failed to load sessions: {}", err);
                self.notifier.failure("Failed to load chat sessions", &err, None);
                Err(err)
            }
        }
    }

    /// Create a session, make it current and start it with an empty history.
    pub async fn create(&self, name: Option<&str>) -> Result<Session> {
        let session = match self.backend.create_session(name).await {
            Ok(session) => session,
            Err(err) => {
                let err = ChatError::from(err);
                warn!("Failed to create session: {}", err);
                self.notifier.failure("Failed to create chat session", &err, None);
                return Err(err);
            }
        };

        info!("Created session {} ({})", session.id, session.name);
        self.store.update(|state| {
            state.sessions.retain(|s| s.id != session.id);
            state.sessions.insert(0, session.clone());
            state.current_session_id = Some(session.id.clone());
            state.histories.insert(session.id.clone(), Vec::new());
        });
        Ok(session)
    }

    /// Switch the current session and reload its history.
    ///
    /// An in-flight send in the previous session keeps running.
    pub async fn select(&self, session_id: &str) -> Result<()> {
        let known = self.store.update(|state| {
            if state.session(session_id).is_none() {
                return false;
            }
            state.current_session_id = Some(session_id.to_string());
            true
        });
        if !known {
            return Err(ChatError::UnknownSession(session_id.to_string()));
        }
        self.load_history(session_id).await
    }

    pub async fn delete(&self, session_id: &str) -> Result<()> {
        if let Err(err) = self.backend.delete_session(session_id).await {
            let err = ChatError::from(err);
            warn!("Failed to delete session {}: {}", session_id, err);
            self.notifier.failure("Failed to delete chat session", &err, None);
            return Err(err);
        }

        self.store.update(|state| {
            state.sessions.retain(|s| s.id != session_id);
            state.histories.remove(session_id);
            state.pipelines.remove(session_id);
            state.resolutions.remove(session_id);
            if state.current_session_id.as_deref() == Some(session_id) {
                state.current_session_id = None;
            }
        });
        info!("Deleted session {}", session_id);
        self.notifier.success("Chat session deleted");
        Ok(())
    }

    /// Local bookkeeping after a confirmed send; the backend already counted it.
    pub fn record_sent(&self, session_id: &str) {
        self.store.update(|state| record_sent(state, session_id));
    }

    pub async fn load_history(&self, session_id: &str) -> Result<()> {
        self.load_history_page(session_id, Page::history()).await
    }

    /// Replace a session's history with the server's, keeping a message that
    /// is still pending for it and any message that resolved after the
    /// request was issued.
    pub async fn load_history_page(&self, session_id: &str, page: Page) -> Result<()> {
        let issued_at = self.store.read(|state| state.revision);
        match self.backend.chat_history(session_id, page).await {
            Ok(records) => {
                let loaded: Vec<ChatMessage> =
                    records.into_iter().map(ChatMessage::from).collect();
                debug!("Loaded {} messages for session {}", loaded.len(), session_id);
                self.store.update(|state| {
                    let merged = merge_local(state, session_id, issued_at, loaded);
                    state.histories.insert(session_id.to_string(), merged);
                });
                Ok(())
            }
            Err(err) => {
                let err = ChatError::from(err);
                warn!("Failed to load history for {}: {}", session_id, err);
                self.store.update(|state| {
                    let kept = merge_local(state, session_id, issued_at, Vec::new());
                    state.histories.insert(session_id.to_string(), kept);
                });
                self.notifier.failure("Failed to load chat history", &err, None);
                Err(err)
            }
        }
    }

    /// Empty the visible message list.
    pub fn clear_chat(&self) {
        self.store.update(|state| {
            if let Some(id) = state.current_session_id.clone() {
                state.histories.insert(id, Vec::new());
            }
        });
    }
}

pub(crate) fn record_sent(state: &mut ChatState, session_id: &str) {
    if let Some(session) = state.sessions.iter_mut().find(|s| s.id == session_id) {
        session.record_message(Utc::now());
    }
}

/// Append what the server snapshot cannot know about yet: messages resolved
/// after `issued_at` that the snapshot lacks, then the outstanding pending one.
fn merge_local(
    state: &ChatState,
    session_id: &str,
    issued_at: u64,
    mut loaded: Vec<ChatMessage>,
) -> Vec<ChatMessage> {
    let late = state.resolved_after(session_id, issued_at);
    let missing: Vec<ChatMessage> = state
        .history(session_id)
        .iter()
        .filter(|message| !message.is_pending() && late.contains(&message.id()))
        .filter(|message| !loaded.iter().any(|known| known.identity == message.identity))
        .cloned()
        .collect();
    if !missing.is_empty() {
        debug!(
            "Keeping {} message(s) resolved during reload of {}",
            missing.len(),
            session_id
        );
    }
    loaded.extend(missing);
    loaded.extend(outstanding_pending(state, session_id));
    loaded
}

fn outstanding_pending(state: &ChatState, session_id: &str) -> Vec<ChatMessage> {
    let pipeline = state.pipeline_state(session_id);
    let Some(temp_id) = pipeline.pending_id() else {
        return Vec::new();
    };
    state
        .history(session_id)
        .iter()
        .filter(|message| message.is_pending() && message.id() == temp_id)
        .cloned()
        .collect()
}
