//! State machine module
//!
//! Per-session send lifecycle: `Idle` or `Sending` one pending message.

mod events;
mod states;
mod transitions;

pub use events::PipelineEvent;
pub use states::PipelineState;
pub use transitions::{StateMachine, StateTransition, TransitionError};
