//! In-memory backend for engine tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chat_client::{
    AuthEvents, AuthResponse, ChatBackend, ClientError, Page, Registration, SendMessageRequest,
    UploadedDocument,
};
use chat_core::{
    ChatRecord, ContextKind, Document, DocumentUpload, ResponseMetadata, Session, User, UserRole,
};
use chat_state::ChatController;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Notify;

/// Operations that can be told to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Login,
    ListSessions,
    CreateSession,
    DeleteSession,
    History,
    Send,
    ListDocuments,
    Upload,
    DeleteDocument,
}

#[derive(Default)]
struct FakeState {
    user: Option<User>,
    token: Option<String>,
    sessions: Vec<Session>,
    histories: HashMap<String, Vec<ChatRecord>>,
    documents: Vec<Document>,
    failures: HashMap<Op, ClientError>,
    sent: Vec<SendMessageRequest>,
    responses: HashMap<String, String>,
}

/// Fake `ChatBackend` with failure injection and optional gates that hold
/// `send_message` or `chat_history` until released.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    events: AuthEvents,
    send_gate: Mutex<Option<Arc<Notify>>>,
    send_started: Notify,
    history_gate: Mutex<Option<Arc<Notify>>>,
    history_started: Notify,
    next_id: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    pub fn controller(self: &Arc<Self>) -> ChatController {
        let backend: Arc<dyn ChatBackend> = self.clone();
        ChatController::new(backend, self.events.subscribe())
    }

    pub fn with_session(&self, id: &str, name: &str) -> Session {
        let session = session(id, name);
        let mut state = self.lock();
        state.sessions.insert(0, session.clone());
        state.histories.entry(id.to_string()).or_default();
        session
    }

    pub fn with_document(&self, id: &str, filename: &str) -> Document {
        let document = document(id, filename, 2048);
        self.lock().documents.insert(0, document.clone());
        document
    }

    pub fn with_history(&self, session_id: &str, records: Vec<ChatRecord>) {
        self.lock().histories.insert(session_id.to_string(), records);
    }

    pub fn with_token(&self, token: &str) {
        self.lock().token = Some(token.to_string());
    }

    /// Reply text for a given prompt.
    pub fn respond(&self, prompt: &str, response: &str) {
        self.lock()
            .responses
            .insert(prompt.to_string(), response.to_string());
    }

    pub fn fail_next(&self, op: Op, err: ClientError) {
        self.lock().failures.insert(op, err);
    }

    /// Hold every `send_message` until the returned handle is notified.
    pub fn gate_sends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.send_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub async fn wait_for_send(&self) {
        self.send_started.notified().await;
    }

    /// Snapshot history at call time but hold the reply until notified.
    pub fn gate_history(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.history_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub async fn wait_for_history(&self) {
        self.history_started.notified().await;
    }

    pub fn sent(&self) -> Vec<SendMessageRequest> {
        self.lock().sent.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// Number of backend calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn enter(&self, op: Op) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.lock().failures.remove(&op);
        match failure {
            Some(ClientError::Unauthorized) => {
                self.lock().token = None;
                self.lock().user = None;
                self.events.login_required();
                Err(ClientError::Unauthorized)
            }
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn login(&self, credential_token: &str) -> Result<AuthResponse, ClientError> {
        self.enter(Op::Login)?;
        let auth = AuthResponse {
            session_token: format!("session-for-{credential_token}"),
            user: user(),
        };
        let mut state = self.lock();
        state.token = Some(auth.session_token.clone());
        state.user = Some(auth.user.clone());
        drop(state);
        self.events.rearm();
        Ok(auth)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
        self.enter(Op::Login)?;
        let mut profile = user();
        profile.email = registration.email.clone();
        profile.display_name = registration.display_name.clone();
        profile.role = registration.role;
        let auth = AuthResponse {
            session_token: "registered".to_string(),
            user: profile,
        };
        self.lock().token = Some(auth.session_token.clone());
        self.events.rearm();
        Ok(auth)
    }

    async fn verify(&self) -> Result<User, ClientError> {
        self.lock().user.clone().ok_or(ClientError::Unauthorized)
    }

    async fn refresh(&self) -> Result<String, ClientError> {
        Ok("refreshed".to_string())
    }

    fn logout(&self) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.token = None;
        state.user = None;
        Ok(())
    }

    fn cached_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    async fn list_sessions(&self, _page: Page) -> Result<Vec<Session>, ClientError> {
        self.enter(Op::ListSessions)?;
        Ok(self.lock().sessions.clone())
    }

    async fn create_session(&self, name: Option<&str>) -> Result<Session, ClientError> {
        self.enter(Op::CreateSession)?;
        let id = self.next_id("s");
        Ok(self.with_session(&id, name.unwrap_or("New Chat")))
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ClientError> {
        self.enter(Op::DeleteSession)?;
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != session_id);
        if state.sessions.len() == before {
            return Err(ClientError::request_failed(Some(404), "Session not found"));
        }
        state.histories.remove(session_id);
        Ok(())
    }

    async fn chat_history(
        &self,
        session_id: &str,
        _page: Page,
    ) -> Result<Vec<ChatRecord>, ClientError> {
        self.enter(Op::History)?;
        let snapshot = self
            .lock()
            .histories
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        self.history_started.notify_one();
        let gate = self.history_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(snapshot)
    }

    async fn send_message(&self, request: SendMessageRequest) -> Result<ChatRecord, ClientError> {
        self.lock().sent.push(request.clone());
        self.send_started.notify_one();
        let gate = self.send_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.enter(Op::Send)?;

        let response = self
            .lock()
            .responses
            .get(&request.message)
            .cloned()
            .unwrap_or_else(|| format!("Answer to: {}", request.message));
        let record = chat(
            &self.next_id("c"),
            &request.session_id,
            &request.message,
            &response,
            &request.document_ids,
        );
        self.lock()
            .histories
            .entry(request.session_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list_documents(&self, _page: Page) -> Result<Vec<Document>, ClientError> {
        self.enter(Op::ListDocuments)?;
        Ok(self.lock().documents.clone())
    }

    async fn upload_document(
        &self,
        upload: DocumentUpload,
    ) -> Result<UploadedDocument, ClientError> {
        self.enter(Op::Upload)?;
        let id = self.next_id("d");
        let document = document(&id, &upload.filename, upload.size());
        self.lock().documents.insert(0, document.clone());
        Ok(UploadedDocument {
            document,
            chunks_created: (upload.size() / 1000).max(1),
        })
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), ClientError> {
        self.enter(Op::DeleteDocument)?;
        self.lock().documents.retain(|d| d.id != document_id);
        Ok(())
    }
}

pub fn user() -> User {
    User {
        id: "u1".to_string(),
        email: "ada@example.edu".to_string(),
        display_name: "Ada".to_string(),
        role: UserRole::Student,
        is_active: true,
    }
}

pub fn session(id: &str, name: &str) -> Session {
    let now = Utc::now();
    Session {
        id: id.to_string(),
        user_id: "u1".to_string(),
        name: name.to_string(),
        message_count: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn document(id: &str, filename: &str, size: u64) -> Document {
    Document {
        id: id.to_string(),
        user_id: "u1".to_string(),
        filename: filename.to_string(),
        file_size: size,
        page_count: 3,
        processed: true,
        created_at: Utc::now(),
    }
}

pub fn chat(
    id: &str,
    session_id: &str,
    message: &str,
    response: &str,
    document_ids: &[String],
) -> ChatRecord {
    let mut metadata = ResponseMetadata::new();
    if !document_ids.is_empty() {
        metadata.insert("document_ids", json!(document_ids));
        metadata.insert("search_method", json!("vector"));
    }
    ChatRecord {
        id: id.to_string(),
        user_id: "u1".to_string(),
        session_id: session_id.to_string(),
        message: message.to_string(),
        response: response.to_string(),
        context_type: ContextKind::for_selection(document_ids),
        document_id: document_ids.first().cloned(),
        metadata,
        created_at: Utc::now(),
    }
}

pub fn request_failed(message: &str) -> ClientError {
    ClientError::request_failed(Some(500), message)
}
