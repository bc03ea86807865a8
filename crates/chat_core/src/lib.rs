//! chat_core - Core types for the document-grounded chat client
//!
//! This crate provides the foundational types shared by the request layer and
//! the interaction engine:
//! - `session` - Conversation sessions as the backend reports them
//! - `message` - Chat turns, optimistic identities and response metadata
//! - `document` - Uploaded reference documents and upload payloads
//! - `user` - Authenticated user profile
//! - `config` / `paths` - Client configuration and on-disk locations

pub mod config;
pub mod document;
pub mod message;
pub mod paths;
pub mod session;
pub mod time;
pub mod user;

// Re-export commonly used types
pub use config::Config;
pub use document::{Document, DocumentUpload, MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE};
pub use message::{
    ChatMessage, ChatRecord, ContextKind, DocumentSource, MessageIdentity, ResponseMetadata,
};
pub use session::Session;
pub use user::{User, UserRole};
