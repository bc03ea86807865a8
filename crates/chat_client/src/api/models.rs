//! Wire shapes of the backend API
//!
//! Field aliases accept the backend's legacy `pdf`/`chats`/`token` keys.

use chat_core::{ChatRecord, Document, Session, User, UserRole};
use serde::{Deserialize, Serialize};

/// Pagination parameters understood by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub const fn sessions() -> Self {
        Self::new(1, 20)
    }

    pub const fn history() -> Self {
        Self::new(1, 50)
    }

    pub const fn documents() -> Self {
        Self::new(1, 20)
    }

    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    #[serde(rename = "firebase_token")]
    pub credential_token: &'a str,
}

/// New account details sent to `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub email: String,
    #[serde(rename = "password")]
    pub secret: String,
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "token")]
    pub session_token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    #[serde(alias = "session_token")]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionEnvelope {
    pub session: Session,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionsPage {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryPage {
    #[serde(default, alias = "chats")]
    pub messages: Vec<ChatRecord>,
}

/// Body of `POST /chat/send`. The full selected document set travels with
/// every grounded request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub document_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageResponse {
    pub chat: ChatRecord,
}

/// Result of an upload: the stored document and how many retrieval chunks
/// the backend derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedDocument {
    #[serde(alias = "pdf")]
    pub document: Document,
    #[serde(default)]
    pub chunks_created: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentsPage {
    #[serde(default, alias = "pdfs")]
    pub documents: Vec<Document>,
}
