//! Top-level chat controller
//!
//! Wires the components around one store and notifier and is the single
//! consumer of the request layer's login-required events.

use std::sync::Arc;

use chat_client::{AuthEvent, AuthResponse, ChatBackend, Registration};
use chat_core::User;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use crate::documents::DocumentLibrary;
use crate::error::{ChatError, Result};
use crate::notice::Notifier;
use crate::pipeline::MessagePipeline;
use crate::sessions::SessionDirectory;
use crate::store::ChatStore;
use crate::upload::UploadCoordinator;

pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    store: ChatStore,
    notifier: Notifier,
    auth_events: broadcast::Receiver<AuthEvent>,
    sessions: SessionDirectory,
    documents: DocumentLibrary,
    pipeline: MessagePipeline,
    uploads: UploadCoordinator,
}

impl ChatController {
    pub fn new(backend: Arc<dyn ChatBackend>, auth_events: broadcast::Receiver<AuthEvent>) -> Self {
        let store = ChatStore::new();
        let notifier = Notifier::new();
        let sessions = SessionDirectory::new(backend.clone(), store.clone(), notifier.clone());
        let documents = DocumentLibrary::new(backend.clone(), store.clone(), notifier.clone());
        let pipeline = MessagePipeline::new(
            backend.clone(),
            store.clone(),
            notifier.clone(),
            sessions.clone(),
        );
        let uploads = UploadCoordinator::new(backend.clone(), store.clone(), notifier.clone());

        store.update(|state| state.user = backend.cached_user());

        Self {
            backend,
            store,
            notifier,
            auth_events,
            sessions,
            documents,
            pipeline,
            uploads,
        }
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn sessions(&self) -> &SessionDirectory {
        &self.sessions
    }

    pub fn documents(&self) -> &DocumentLibrary {
        &self.documents
    }

    pub fn pipeline(&self) -> &MessagePipeline {
        &self.pipeline
    }

    pub fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    pub fn user(&self) -> Option<User> {
        self.store.read(|state| state.user.clone())
    }

    /// Load the session directory and the document candidates.
    ///
    /// Both are attempted; the first failure is returned.
    pub async fn bootstrap(&mut self) -> Result<()> {
        let (sessions, documents) = tokio::join!(self.sessions.list(), self.documents.load());
        self.drain_auth_events();
        sessions?;
        documents?;
        Ok(())
    }

    pub async fn login(&mut self, credential_token: &str) -> Result<User> {
        let result = self.backend.login(credential_token).await;
        self.finish_sign_in(result, "Login successful!")
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<User> {
        let result = self.backend.register(registration).await;
        self.finish_sign_in(result, "Registration successful!")
    }

    fn finish_sign_in(
        &mut self,
        result: chat_client::Result<AuthResponse>,
        message: &str,
    ) -> Result<User> {
        // A rejected attempt raises LoginRequired itself; consume it here.
        self.drain_auth_events();
        match result {
            Ok(auth) => {
                self.store.update(|state| {
                    state.reset();
                    state.user = Some(auth.user.clone());
                });
                info!("Signed in as {}", auth.user.email);
                self.notifier.success(message);
                Ok(auth.user)
            }
            Err(err) => {
                let err = ChatError::from(err);
                let shown = match &err {
                    ChatError::Unauthorized => ChatError::RequestFailed {
                        status: Some(401),
                        message: "Invalid credentials".to_string(),
                    },
                    other => other.clone(),
                };
                self.notifier.failure("Authentication failed", &shown, None);
                Err(err)
            }
        }
    }

    /// Drop the credential and everything loaded for the user.
    pub fn logout(&mut self) -> Result<()> {
        self.backend.logout().map_err(ChatError::from)?;
        self.store.update(|state| state.reset());
        self.drain_auth_events();
        info!("Logged out");
        Ok(())
    }

    /// React to a request-layer auth event.
    pub fn handle_auth_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::LoginRequired => {
                warn!("Session expired, login required");
                self.store.update(|state| {
                    state.reset();
                    state.login_required = true;
                });
            }
        }
    }

    /// Handle every auth event queued so far. Returns true if a login is now
    /// required.
    pub fn drain_auth_events(&mut self) -> bool {
        loop {
            match self.auth_events.try_recv() {
                Ok(event) => self.handle_auth_event(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} auth events", skipped);
                    self.handle_auth_event(AuthEvent::LoginRequired);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        self.login_required()
    }

    /// Wait for the next auth event and handle it.
    pub async fn next_auth_event(&mut self) -> Option<AuthEvent> {
        loop {
            match self.auth_events.recv().await {
                Ok(event) => {
                    self.handle_auth_event(event);
                    return Some(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Missed {} auth events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn login_required(&self) -> bool {
        self.store.read(|state| state.login_required)
    }
}
