//! State transitions
//!
//! A submit is only accepted from `Idle`; resolve and fail are only accepted
//! for the pending message that is actually outstanding.

use thiserror::Error;

use super::events::PipelineEvent;
use super::states::PipelineState;

const MAX_HISTORY: usize = 50;

/// Error type for invalid state transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from} with event {event}")]
    InvalidTransition { from: &'static str, event: &'static str },

    #[error("Event for {got} does not match outstanding message {expected}")]
    IdentityMismatch { expected: String, got: String },
}

/// Represents a state transition result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: PipelineState,
    pub to: PipelineState,
    pub event: PipelineEvent,
}

/// State machine for one session's send pipeline.
#[derive(Debug, Clone)]
pub struct StateMachine {
    current_state: PipelineState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine in Idle state.
    pub fn new() -> Self {
        Self {
            current_state: PipelineState::Idle,
            history: Vec::new(),
            max_history: MAX_HISTORY,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.current_state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event, moving to the next state or rejecting the event
    /// without changing anything.
    pub fn handle_event(
        &mut self,
        event: PipelineEvent,
    ) -> Result<StateTransition, TransitionError> {
        let old_state = self.current_state.clone();
        let new_state = Self::compute_next_state(&old_state, &event)?;
        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        Ok(transition)
    }

    fn compute_next_state(
        state: &PipelineState,
        event: &PipelineEvent,
    ) -> Result<PipelineState, TransitionError> {
        use PipelineEvent::*;
        use PipelineState::*;

        match (state, event) {
            (Idle, Submitted { temp_id, text }) => Ok(Sending {
                temp_id: temp_id.clone(),
                text: text.clone(),
            }),

            (Sending { temp_id: expected, .. }, Resolved { temp_id, .. })
            | (Sending { temp_id: expected, .. }, Failed { temp_id, .. }) => {
                if expected == temp_id {
                    Ok(Idle)
                } else {
                    Err(TransitionError::IdentityMismatch {
                        expected: expected.clone(),
                        got: temp_id.clone(),
                    })
                }
            }

            _ => Err(TransitionError::InvalidTransition {
                from: state.label(),
                event: event.name(),
            }),
        }
    }

    /// Check if an event would be accepted without executing it.
    pub fn can_transition(&self, event: &PipelineEvent) -> bool {
        Self::compute_next_state(&self.current_state, event).is_ok()
    }

    /// Reset to Idle state.
    pub fn reset(&mut self) {
        self.current_state = PipelineState::Idle;
    }
}
