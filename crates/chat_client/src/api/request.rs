use chat_core::DocumentUpload;
use reqwest::Method;
use serde::Serialize;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Sent as multipart form field `file`
    Multipart(DocumentUpload),
}

/// Description of one backend call, independent of the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `/chat/sessions`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            ClientError::request_failed(None, format!("Failed to encode request body: {e}"))
        })?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, upload: DocumentUpload) -> Self {
        self.body = RequestBody::Multipart(upload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_parts() {
        let req = ApiRequest::get("/chat/sessions")
            .with_query(vec![("page".to_string(), "2".to_string())]);
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.query.len(), 1);
        assert!(matches!(req.body, RequestBody::Empty));

        let req = ApiRequest::post("/chat/session")
            .json(&serde_json::json!({"session_name": "Statics"}))
            .expect("json");
        assert!(matches!(req.body, RequestBody::Json(ref v) if v["session_name"] == "Statics"));
    }
}
