//! User-visible notifications
//!
//! Notices are fire-and-forget: with no subscriber they are dropped.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::ChatError;

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
    /// Indeterminate progress; superseded by a later notice with the same key.
    Loading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub text: String,
    /// Groups a loading notice with the notice that ends it.
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn notify(&self, level: NoticeLevel, text: impl Into<String>, key: Option<&str>) {
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            text: text.into(),
            key: key.map(str::to_string),
        };
        let _ = self.tx.send(notice);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.notify(NoticeLevel::Info, text, None);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.notify(NoticeLevel::Success, text, None);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.notify(NoticeLevel::Error, text, None);
    }

    pub fn loading(&self, key: &str, text: impl Into<String>) {
        self.notify(NoticeLevel::Loading, text, Some(key));
    }

    /// Report a failed operation. Unauthorized raises no error: the login
    /// redirect replaces any local message. A keyed notice still gets an
    /// `Info` entry under its key so a pending `Loading` one is closed.
    pub fn failure(&self, action: &str, err: &ChatError, key: Option<&str>) {
        if err.is_unauthorized() {
            if let Some(key) = key {
                self.notify(NoticeLevel::Info, format!("{action}: login required"), Some(key));
            }
            return;
        }
        self.notify(NoticeLevel::Error, format!("{action}: {err}"), key);
    }
}
