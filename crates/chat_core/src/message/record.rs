//! Chat turns
//!
//! `ChatRecord` is the backend's JSON shape. `ChatMessage` is what the engine
//! keeps in a session's history: either a locally synthesized pending turn or
//! a resolved one carrying the server identity.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::ResponseMetadata;

/// Prefix of locally generated message identities.
pub const TEMP_ID_PREFIX: &str = "temp-";

static TEMP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Whether a turn was answered without reference material or grounded in
/// selected documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    #[serde(rename = "direct")]
    Direct,
    #[serde(
        rename = "document",
        alias = "pdf",
        alias = "pdf_multiple",
        alias = "document_grounded"
    )]
    DocumentGrounded,
}

impl ContextKind {
    pub fn for_selection(selected: &[String]) -> Self {
        if selected.is_empty() {
            Self::Direct
        } else {
            Self::DocumentGrounded
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::DocumentGrounded => "document",
        }
    }
}

/// Identity of a message in a session history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MessageIdentity {
    /// Locally synthesized, awaiting the backend.
    Pending { temp_id: String },
    /// Confirmed by the backend.
    Resolved { server_id: String },
}

impl MessageIdentity {
    /// Generate a fresh time-based pending identity.
    pub fn next_pending() -> Self {
        let seq = TEMP_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::Pending {
            temp_id: format!(
                "{TEMP_ID_PREFIX}{}-{seq}",
                Utc::now().timestamp_millis()
            ),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Pending { temp_id } => temp_id,
            Self::Resolved { server_id } => server_id,
        }
    }
}

/// A chat turn exactly as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub response: String,
    pub context_type: ContextKind,
    #[serde(default, alias = "pdf_id")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub metadata: ResponseMetadata,
    #[serde(with = "crate::time")]
    pub created_at: DateTime<Utc>,
}

/// A turn held in a session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub identity: MessageIdentity,
    pub session_id: String,
    pub user_id: String,
    /// User-authored text
    pub message: String,
    /// Assistant response, empty while pending
    pub response: String,
    pub context_kind: ContextKind,
    /// First referenced document, kept for display
    pub document_id: Option<String>,
    pub metadata: ResponseMetadata,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build the optimistic placeholder shown while a send is in flight.
    pub fn pending(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
        selected_documents: &[String],
    ) -> Self {
        Self {
            identity: MessageIdentity::next_pending(),
            session_id: session_id.into(),
            user_id: user_id.into(),
            message: text.into(),
            response: String::new(),
            context_kind: ContextKind::for_selection(selected_documents),
            document_id: selected_documents.first().cloned(),
            metadata: ResponseMetadata::default(),
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.identity.is_pending()
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }
}

impl From<ChatRecord> for ChatMessage {
    fn from(record: ChatRecord) -> Self {
        Self {
            identity: MessageIdentity::Resolved {
                server_id: record.id,
            },
            session_id: record.session_id,
            user_id: record.user_id,
            message: record.message,
            response: record.response,
            context_kind: record.context_type,
            document_id: record.document_id,
            metadata: record.metadata,
            created_at: record.created_at,
        }
    }
}
