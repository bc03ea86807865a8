//! Pipeline events

use serde::{Deserialize, Serialize};

/// Events that move a session's pipeline between states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A pending message was appended and its request dispatched.
    Submitted { temp_id: String, text: String },

    /// The backend confirmed the message under `server_id`.
    Resolved { temp_id: String, server_id: String },

    /// The request failed and the pending message was rolled back.
    Failed { temp_id: String, error: String },
}

impl PipelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::Submitted { .. } => "submitted",
            PipelineEvent::Resolved { .. } => "resolved",
            PipelineEvent::Failed { .. } => "failed",
        }
    }

    pub fn temp_id(&self) -> &str {
        match self {
            PipelineEvent::Submitted { temp_id, .. }
            | PipelineEvent::Resolved { temp_id, .. }
            | PipelineEvent::Failed { temp_id, .. } => temp_id,
        }
    }
}
