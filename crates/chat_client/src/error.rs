use thiserror::Error;

/// Failure of a backend call as seen by callers of the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The backend rejected the credential (HTTP 401). The credential has
    /// already been cleared and a login-required event raised.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-2xx response or transport failure.
    #[error("{message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("credential storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn request_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RequestFailed { status, .. } => *status,
            Self::Storage(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
