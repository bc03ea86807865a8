//! Pipeline states

use serde::{Deserialize, Serialize};

/// Send state of one session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// No message outstanding; a submit is accepted.
    #[default]
    Idle,

    /// One pending message is outstanding.
    Sending {
        /// Temporary identity of the pending message.
        temp_id: String,
        /// Text as the user typed it, restored on failure.
        text: String,
    },
}

impl PipelineState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PipelineState::Idle)
    }

    pub fn is_sending(&self) -> bool {
        matches!(self, PipelineState::Sending { .. })
    }

    /// Temporary identity of the outstanding message, if any.
    pub fn pending_id(&self) -> Option<&str> {
        match self {
            PipelineState::Sending { temp_id, .. } => Some(temp_id),
            PipelineState::Idle => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Sending { .. } => "sending",
        }
    }
}
