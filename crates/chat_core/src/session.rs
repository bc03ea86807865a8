//! Conversation sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named conversation thread owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,

    #[serde(default)]
    pub user_id: String,

    /// Display name
    #[serde(rename = "session_name")]
    pub name: String,

    #[serde(default)]
    pub message_count: u32,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(with = "crate::time")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "crate::time")]
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Session {
    /// Local bookkeeping after a message was persisted by the backend.
    pub fn record_message(&mut self, at: DateTime<Utc>) {
        self.message_count += 1;
        self.updated_at = at;
    }
}
