use std::sync::Arc;

use async_trait::async_trait;
use http::Extensions;
use log::{error, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};

use super::events::AuthEvents;
use super::store::CredentialStore;

/// Attaches `Authorization: Bearer <token>` and reacts to 401 responses by
/// clearing the credential and raising a login-required event.
#[derive(Debug, Clone)]
pub struct BearerAuthMiddleware {
    credentials: Arc<dyn CredentialStore>,
    events: AuthEvents,
}

impl BearerAuthMiddleware {
    pub fn new(credentials: Arc<dyn CredentialStore>, events: AuthEvents) -> Self {
        Self {
            credentials,
            events,
        }
    }

    fn attach(&self, request: &mut Request) {
        if request.headers().contains_key(AUTHORIZATION) {
            return;
        }
        let Some(token) = self.credentials.token() else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => warn!("Stored credential is not a valid header value: {}", e),
        }
    }

    fn expire(&self) {
        if let Err(e) = self.credentials.clear() {
            error!("Failed to clear rejected credential: {}", e);
        }
        if self.events.login_required() {
            warn!("Credential rejected by backend, login required");
        }
    }
}

#[async_trait]
impl Middleware for BearerAuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.attach(&mut req);
        let response = next.run(req, extensions).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.expire();
        }
        Ok(response)
    }
}
