//! chat_client - authenticated request layer
//!
//! Every backend call goes through [`ApiClient::execute`], which attaches the
//! stored bearer credential and turns HTTP failures into [`ClientError`]s. A
//! 401 from any endpoint clears the credential and raises a single
//! [`AuthEvent::LoginRequired`].

pub mod api;
pub mod auth;
pub mod client_trait;
pub mod error;
pub mod utils;

pub use api::client::ApiClient;
pub use api::models::{
    AuthResponse, Page, Registration, SendMessageRequest, UploadedDocument,
};
pub use api::request::{ApiRequest, RequestBody};
pub use auth::{
    AuthEvent, AuthEvents, BearerAuthMiddleware, CredentialStore, FileCredentialStore,
    MemoryCredentialStore, StoredCredentials,
};
pub use chat_core::Config;
pub use client_trait::ChatBackend;
pub use error::{ClientError, Result};
