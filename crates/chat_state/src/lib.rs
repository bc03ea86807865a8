//! chat_state - interaction engine for the document-grounded chat client
//!
//! Session directory, context selector, message pipeline and upload
//! coordinator over one observable [`ChatStore`], driven by a
//! [`ChatController`].

pub mod controller;
pub mod documents;
pub mod error;
pub mod machine;
pub mod notice;
pub mod pipeline;
pub mod selector;
pub mod sessions;
pub mod store;
pub mod upload;

// Re-export commonly used types
pub use controller::ChatController;
pub use documents::DocumentLibrary;
pub use error::{ChatError, Result, ValidationError};
pub use machine::{PipelineEvent, PipelineState, StateMachine, StateTransition, TransitionError};
pub use notice::{Notice, NoticeLevel, Notifier};
pub use pipeline::MessagePipeline;
pub use selector::ContextSelector;
pub use sessions::SessionDirectory;
pub use store::{ChatState, ChatStore};
pub use upload::UploadCoordinator;
