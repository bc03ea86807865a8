use async_trait::async_trait;
use chat_core::{ChatRecord, Document, DocumentUpload, Session, User};
use log::info;

use crate::api::client::ApiClient;
use crate::api::models::{
    AuthResponse, CreateSessionRequest, DocumentsPage, HistoryPage, LoginRequest, Page,
    RefreshResponse, Registration, SendMessageRequest, SendMessageResponse, SessionEnvelope,
    SessionsPage, UploadedDocument, VerifyResponse,
};
use crate::api::request::ApiRequest;
use crate::error::{ClientError, Result};

/// Backend operations the chat engine depends on.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Exchange an identity-provider token for a session credential.
    async fn login(&self, credential_token: &str) -> Result<AuthResponse>;

    async fn register(&self, registration: &Registration) -> Result<AuthResponse>;

    /// Check the stored credential and refresh the cached profile.
    async fn verify(&self) -> Result<User>;

    async fn refresh(&self) -> Result<String>;

    /// Forget the credential locally.
    fn logout(&self) -> Result<()>;

    fn cached_user(&self) -> Option<User>;

    async fn list_sessions(&self, page: Page) -> Result<Vec<Session>>;

    async fn create_session(&self, name: Option<&str>) -> Result<Session>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    async fn chat_history(&self, session_id: &str, page: Page) -> Result<Vec<ChatRecord>>;

    async fn send_message(&self, request: SendMessageRequest) -> Result<ChatRecord>;

    async fn list_documents(&self, page: Page) -> Result<Vec<Document>>;

    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadedDocument>;

    async fn delete_document(&self, document_id: &str) -> Result<()>;
}

impl ApiClient {
    fn store_login(&self, auth: &AuthResponse) -> Result<()> {
        self.credentials()
            .save(&auth.session_token, Some(&auth.user))?;
        self.auth_events().rearm();
        info!("Signed in as {}", auth.user.email);
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn login(&self, credential_token: &str) -> Result<AuthResponse> {
        let req = ApiRequest::post("/auth/login").json(&LoginRequest { credential_token })?;
        let auth: AuthResponse = self.execute(req).await?;
        self.store_login(&auth)?;
        Ok(auth)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let req = ApiRequest::post("/auth/register").json(registration)?;
        let auth: AuthResponse = self.execute(req).await?;
        self.store_login(&auth)?;
        Ok(auth)
    }

    async fn verify(&self) -> Result<User> {
        let verified: VerifyResponse = self.execute(ApiRequest::get("/auth/verify")).await?;
        if !verified.valid {
            return Err(ClientError::request_failed(None, "Credential is not valid"));
        }
        if let Some(token) = self.credentials().token() {
            self.credentials().save(&token, Some(&verified.user))?;
        }
        Ok(verified.user)
    }

    async fn refresh(&self) -> Result<String> {
        let refreshed: RefreshResponse = self.execute(ApiRequest::post("/auth/refresh")).await?;
        self.credentials().set_token(&refreshed.token)?;
        self.auth_events().rearm();
        Ok(refreshed.token)
    }

    fn logout(&self) -> Result<()> {
        self.credentials().clear()
    }

    fn cached_user(&self) -> Option<User> {
        self.credentials().user()
    }

    async fn list_sessions(&self, page: Page) -> Result<Vec<Session>> {
        let req = ApiRequest::get("/chat/sessions").with_query(page.query());
        let listed: SessionsPage = self.execute(req).await?;
        Ok(listed.sessions)
    }

    async fn create_session(&self, name: Option<&str>) -> Result<Session> {
        let req = ApiRequest::post("/chat/session").json(&CreateSessionRequest {
            session_name: name,
        })?;
        let created: SessionEnvelope = self.execute(req).await?;
        Ok(created.session)
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.execute_empty(ApiRequest::delete(format!("/chat/session/{session_id}")))
            .await
    }

    async fn chat_history(&self, session_id: &str, page: Page) -> Result<Vec<ChatRecord>> {
        let req =
            ApiRequest::get(format!("/chat/history/{session_id}")).with_query(page.query());
        let history: HistoryPage = self.execute(req).await?;
        Ok(history.messages)
    }

    async fn send_message(&self, request: SendMessageRequest) -> Result<ChatRecord> {
        let req = ApiRequest::post("/chat/send").json(&request)?;
        let sent: SendMessageResponse = self.execute(req).await?;
        Ok(sent.chat)
    }

    async fn list_documents(&self, page: Page) -> Result<Vec<Document>> {
        let req = ApiRequest::get("/student/documents").with_query(page.query());
        let listed: DocumentsPage = self.execute(req).await?;
        Ok(listed.documents)
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadedDocument> {
        self.execute(ApiRequest::post("/student/upload-document").multipart(upload))
            .await
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        self.execute_empty(ApiRequest::delete(format!(
            "/student/document/{document_id}"
        )))
        .await
    }
}
