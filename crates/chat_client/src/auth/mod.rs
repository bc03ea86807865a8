//! Credential handling
//!
//! - `store` - persisted bearer token and cached user profile
//! - `events` - login-required notification, raised at most once per expiry
//! - `middleware` - attaches the bearer header and watches for 401s

mod events;
mod middleware;
mod store;

pub use events::{AuthEvent, AuthEvents};
pub use middleware::BearerAuthMiddleware;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredentials};
