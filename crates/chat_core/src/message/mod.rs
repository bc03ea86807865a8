//! Message module - chat turns and their response metadata

mod metadata;
mod record;

pub use metadata::{DocumentSource, ResponseMetadata};
pub use record::{ChatMessage, ChatRecord, ContextKind, MessageIdentity, TEMP_ID_PREFIX};
