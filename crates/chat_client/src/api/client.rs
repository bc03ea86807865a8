use std::sync::Arc;
use std::time::{Duration, Instant};

use chat_core::{Config, DocumentUpload};
use log::{debug, error, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Proxy, Request, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;

use crate::api::request::{ApiRequest, RequestBody};
use crate::auth::{AuthEvents, BearerAuthMiddleware, CredentialStore};
use crate::error::{ClientError, Result};
use crate::utils::http_utils::{
    describe_transport_error, error_message_from_body, generic_status_message,
};

/// Multipart field name the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

/// The single entry point for backend calls.
///
/// Cloning is cheap; clones share the connection pool, the credential store
/// and the auth event channel.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    client: ClientWithMiddleware,
    config: Config,
    credentials: Arc<dyn CredentialStore>,
    events: AuthEvents,
}

impl ApiClient {
    pub fn new(config: Config, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::with_events(config, credentials, AuthEvents::new())
    }

    pub fn with_events(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        events: AuthEvents,
    ) -> Result<Self> {
        let http = Self::build_http_client(&config)?;
        let client = ClientBuilder::new(http.clone())
            .with(BearerAuthMiddleware::new(
                Arc::clone(&credentials),
                events.clone(),
            ))
            .build();

        Ok(Self {
            http,
            client,
            config,
            credentials,
            events,
        })
    }

    fn build_http_client(config: &Config) -> Result<Client> {
        let mut builder = Client::builder()
            .default_headers(Self::default_headers())
            .timeout(Duration::from_secs(config.request_timeout_secs));
        if !config.http_proxy.is_empty() {
            let proxy = Proxy::http(&config.http_proxy).map_err(|e| {
                ClientError::request_failed(None, format!("Invalid HTTP proxy: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }
        if !config.https_proxy.is_empty() {
            let proxy = Proxy::https(&config.https_proxy).map_err(|e| {
                ClientError::request_failed(None, format!("Invalid HTTPS proxy: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }
        builder.build().map_err(|e| {
            ClientError::request_failed(None, format!("Failed to build HTTP client: {e}"))
        })
    }

    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn auth_events(&self) -> &AuthEvents {
        &self.events
    }

    /// Run one backend call and decode its JSON body.
    pub async fn execute<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T> {
        let response = self.dispatch(req).await?;
        let url = response.url().to_string();
        response.json::<T>().await.map_err(|e| {
            error!("Failed to decode response from {}: {}", url, e);
            ClientError::request_failed(None, format!("Invalid response from server: {e}"))
        })
    }

    /// Run one backend call whose body carries nothing the caller needs.
    pub async fn execute_empty(&self, req: ApiRequest) -> Result<()> {
        self.dispatch(req).await.map(|_| ())
    }

    async fn dispatch(&self, req: ApiRequest) -> Result<Response> {
        let request = self.build_request(req)?;
        let method = request.method().clone();
        let url = request.url().to_string();
        if self.config.verbose_http {
            debug!("Request headers for {} {}: {:?}", method, url, request.headers());
        }

        let started = Instant::now();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ClientError::request_failed(None, describe_transport_error(&url, &e)))?;
        let status = response.status();
        info!(
            "{} {} -> {} ({} ms)",
            method,
            url,
            status.as_u16(),
            started.elapsed().as_millis()
        );
        if self.config.verbose_http {
            debug!("Response headers: {:?}", response.headers());
        }

        if status == StatusCode::UNAUTHORIZED {
            // The middleware has already cleared the credential.
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message_from_body(&body)
                .unwrap_or_else(|| generic_status_message(status.as_u16()));
            error!("Request to {} failed ({}): {}", url, status, message);
            return Err(ClientError::request_failed(Some(status.as_u16()), message));
        }
        Ok(response)
    }

    fn build_request(&self, req: ApiRequest) -> Result<Request> {
        let url = self.config.endpoint(&req.path);
        let mut builder = self.http.request(req.method, &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        builder = match req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(upload) => builder.multipart(Self::upload_form(upload)?),
        };
        builder.build().map_err(|e| {
            ClientError::request_failed(None, format!("Failed to build request for {url}: {e}"))
        })
    }

    fn upload_form(upload: DocumentUpload) -> Result<Form> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.media_type)
            .map_err(|e| {
                ClientError::request_failed(None, format!("Invalid media type: {e}"))
            })?;
        Ok(Form::new().part(UPLOAD_FIELD, part))
    }
}
