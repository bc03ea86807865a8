//! Message pipeline
//!
//! Sending is optimistic: a pending message is appended at once and later
//! replaced by the server's message, or removed on failure. The owning
//! session is captured at submit, so a resolution always lands in that
//! session's history even if the user has switched away.

use std::sync::Arc;

use chat_client::{ChatBackend, SendMessageRequest};
use chat_core::{ChatMessage, ChatRecord, MessageIdentity};
use tracing::{debug, info, warn};

use crate::error::{ChatError, Result, ValidationError};
use crate::machine::PipelineEvent;
use crate::notice::Notifier;
use crate::sessions::{record_sent, SessionDirectory};
use crate::store::{ChatState, ChatStore};

#[derive(Clone)]
pub struct MessagePipeline {
    backend: Arc<dyn ChatBackend>,
    store: ChatStore,
    notifier: Notifier,
    sessions: SessionDirectory,
}

/// What `submit` put in place before dispatching.
struct Submitted {
    session_id: String,
    temp_id: String,
    request: SendMessageRequest,
}

impl MessagePipeline {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        store: ChatStore,
        notifier: Notifier,
        sessions: SessionDirectory,
    ) -> Self {
        Self {
            backend,
            store,
            notifier,
            sessions,
        }
    }

    /// Send `text` in the current session, creating one first if needed.
    ///
    /// Returns the resolved message. On failure the pending message is gone
    /// and `text` is back in the draft.
    pub async fn submit(&self, text: &str) -> Result<ChatMessage> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            let err = ChatError::from(ValidationError::EmptyMessage);
            self.notifier.error(err.to_string());
            return Err(err);
        }

        let session_id = match self.store.read(|state| state.current_session_id.clone()) {
            Some(id) => id,
            None => match self.sessions.create(None).await {
                Ok(session) => session.id,
                Err(err) => {
                    self.store.update(|state| state.draft = text.to_string());
                    return Err(err);
                }
            },
        };

        self.submit_to(&session_id, text).await
    }

    /// Send `text` in a specific session.
    pub async fn submit_to(&self, session_id: &str, text: &str) -> Result<ChatMessage> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            let err = ChatError::from(ValidationError::EmptyMessage);
            self.notifier.error(err.to_string());
            return Err(err);
        }

        let submitted = self
            .store
            .update(|state| begin_send(state, session_id, trimmed, text))?;
        debug!(
            "Sending {} in session {} with {} documents",
            submitted.temp_id,
            submitted.session_id,
            submitted.request.document_ids.len()
        );

        match self.backend.send_message(submitted.request.clone()).await {
            Ok(record) => Ok(self.resolve(&submitted, record)),
            Err(err) => Err(self.fail(&submitted, text, ChatError::from(err))),
        }
    }

    fn resolve(&self, submitted: &Submitted, record: ChatRecord) -> ChatMessage {
        let resolved = ChatMessage::from(record);
        let server_id = resolved.id().to_string();

        let replaced = self.store.update(|state| {
            let replaced = replace_pending(
                state,
                &submitted.session_id,
                &submitted.temp_id,
                &resolved,
            );
            if replaced {
                state.note_resolution(&submitted.session_id, &server_id);
            }
            let event = PipelineEvent::Resolved {
                temp_id: submitted.temp_id.clone(),
                server_id: server_id.clone(),
            };
            settle(state, &submitted.session_id, event);
            record_sent(state, &submitted.session_id);
            replaced
        });

        if replaced {
            info!(
                "Resolved {} as {} in session {}",
                submitted.temp_id, server_id, submitted.session_id
            );
        } else {
            debug!(
                "Pending {} no longer present in session {}; resolution dropped",
                submitted.temp_id, submitted.session_id
            );
        }
        resolved
    }

    fn fail(&self, submitted: &Submitted, original_text: &str, err: ChatError) -> ChatError {
        warn!("Send failed in session {}: {}", submitted.session_id, err);

        self.store.update(|state| {
            if let Some(history) = state.histories.get_mut(&submitted.session_id) {
                history.retain(|message| !is_identity(message, &submitted.temp_id));
            }
            state.draft = original_text.to_string();
            let event = PipelineEvent::Failed {
                temp_id: submitted.temp_id.clone(),
                error: err.to_string(),
            };
            settle(state, &submitted.session_id, event);
        });

        self.notifier.failure("Failed to send message", &err, None);
        err
    }
}

/// Guard, append the pending message and move the pipeline to `Sending`, all
/// in one store mutation.
fn begin_send(
    state: &mut ChatState,
    session_id: &str,
    trimmed: &str,
    original: &str,
) -> Result<Submitted> {
    if state.is_sending(session_id) {
        return Err(ChatError::Busy(session_id.to_string()));
    }

    let document_ids = state.selector.selected_ids().to_vec();
    let user_id = state
        .user
        .as_ref()
        .map(|user| user.id.clone())
        .unwrap_or_default();
    let pending = ChatMessage::pending(session_id, user_id, trimmed, &document_ids);
    let temp_id = pending.id().to_string();

    let event = PipelineEvent::Submitted {
        temp_id: temp_id.clone(),
        text: original.to_string(),
    };
    if state.pipeline_mut(session_id).handle_event(event).is_err() {
        return Err(ChatError::Busy(session_id.to_string()));
    }

    state
        .histories
        .entry(session_id.to_string())
        .or_default()
        .push(pending);
    state.draft.clear();

    Ok(Submitted {
        session_id: session_id.to_string(),
        temp_id,
        request: SendMessageRequest {
            message: trimmed.to_string(),
            session_id: session_id.to_string(),
            document_ids,
        },
    })
}

/// Return the owning session's pipeline to `Idle`. The pipeline is gone if
/// the session was deleted or the user signed out meanwhile.
fn settle(state: &mut ChatState, session_id: &str, event: PipelineEvent) {
    let Some(machine) = state.pipelines.get_mut(session_id) else {
        debug!("No pipeline left for session {}", session_id);
        return;
    };
    if let Err(err) = machine.handle_event(event) {
        debug!("Ignoring stale pipeline event for {}: {}", session_id, err);
    }
}

/// Swap the pending entry for the resolved message in place. Returns false
/// when the pending entry is gone (history cleared or session deleted).
fn replace_pending(
    state: &mut ChatState,
    session_id: &str,
    temp_id: &str,
    resolved: &ChatMessage,
) -> bool {
    let Some(history) = state.histories.get_mut(session_id) else {
        return false;
    };
    // A reload may already have brought in the confirmed message.
    if history.iter().any(|message| message.identity == resolved.identity) {
        let before = history.len();
        history.retain(|message| !is_identity(message, temp_id));
        return history.len() != before;
    }
    let Some(slot) = history
        .iter_mut()
        .find(|message| is_identity(message, temp_id))
    else {
        return false;
    };
    *slot = resolved.clone();
    true
}

fn is_identity(message: &ChatMessage, temp_id: &str) -> bool {
    matches!(&message.identity, MessageIdentity::Pending { temp_id: id } if id == temp_id)
}
