//! Engine error types

use chat_client::ClientError;
use thiserror::Error;

/// Input rejected before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Only PDF files are allowed (got {media_type})")]
    InvalidFileType { media_type: String },

    #[error("File size must be less than {} MB (got {size} bytes)", .limit / (1024 * 1024))]
    FileTooLarge { size: u64, limit: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The credential was rejected; handled globally by the controller.
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    RequestFailed { status: Option<u16>, message: String },

    /// A message is already in flight for this session.
    #[error("A message is already being sent in session {0}")]
    Busy(String),

    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

impl ChatError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ChatError::Unauthorized)
    }
}

impl From<ClientError> for ChatError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => ChatError::Unauthorized,
            ClientError::RequestFailed { status, message } => {
                ChatError::RequestFailed { status, message }
            }
            ClientError::Storage(message) => ChatError::RequestFailed {
                status: None,
                message,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
