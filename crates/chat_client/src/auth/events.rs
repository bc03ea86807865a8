use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The credential was rejected; the user must log in again.
    LoginRequired,
}

/// Broadcasts auth-level events to whoever owns navigation.
///
/// `LoginRequired` is raised at most once until a new credential is stored,
/// no matter how many in-flight requests observe a 401.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
    redirecting: Arc<AtomicBool>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tx,
            redirecting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Raise `LoginRequired` unless a redirect is already underway.
    ///
    /// Returns true when this call raised the event.
    pub fn login_required(&self) -> bool {
        if self.redirecting.swap(true, Ordering::SeqCst) {
            return false;
        }
        // No subscriber just means nobody is navigating yet.
        let _ = self.tx.send(AuthEvent::LoginRequired);
        true
    }

    /// Called once a new credential is in place.
    pub fn rearm(&self) {
        self.redirecting.store(false, Ordering::SeqCst);
    }

    pub fn is_redirecting(&self) -> bool {
        self.redirecting.load(Ordering::SeqCst)
    }
}
