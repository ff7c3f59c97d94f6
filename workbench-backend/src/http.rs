//! HTTP client for an Appwrite-style REST backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::backend::Backend;
use crate::document::{user_data, Account, Data, Document, DocumentList, Session};
use crate::error::{BackendError, Result};
use crate::query::Query;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const SESSION_HEADER: &str = "X-Appwrite-Session";

/// Extract a human-readable message from a JSON error body.
///
/// Tries `message`, then falls back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
            return msg.to_string();
        }
    }
    body.to_string()
}

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL including the API version path, e.g. `https://cloud.example.com/v1`.
    pub endpoint: String,
    pub project_id: String,
    /// Server API key. Document calls are made with it when present.
    pub api_key: Option<String>,
    pub database_id: String,
}

/// Client for the hosted backend's REST API.
pub struct HttpBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("endpoint", &self.config.endpoint)
            .field("project_id", &self.config.project_id)
            .field("database_id", &self.config.database_id)
            .finish()
    }
}

impl HttpBackend {
    pub fn new(mut config: HttpBackendConfig) -> Self {
        config.endpoint = config.endpoint.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            config,
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint,
            urlencoding::encode(&self.config.database_id),
            urlencoding::encode(collection),
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.documents_url(collection),
            urlencoding::encode(id)
        )
    }

    /// Attach project and key headers.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(PROJECT_HEADER, &self.config.project_id);
        match &self.config.api_key {
            Some(key) => request.header(KEY_HEADER, key),
            None => request,
        }
    }

    /// Attach the project header and a user session.
    fn with_session(&self, request: RequestBuilder, secret: &str) -> RequestBuilder {
        request
            .header(PROJECT_HEADER, &self.config.project_id)
            .header(SESSION_HEADER, secret)
    }

    /// Map an HTTP response to a `BackendError` based on status code.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        debug!(status = status_code, %message, "backend request failed");

        match status_code {
            400 => Err(BackendError::Invalid(message)),
            401 => Err(BackendError::Unauthorized(message)),
            403 => Err(BackendError::Forbidden(message)),
            404 => Err(BackendError::NotFound(message)),
            409 => Err(BackendError::Conflict(message)),
            _ => Err(BackendError::Api {
                status: status_code,
                body: message,
            }),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let response = self.check_response(response).await?;
        let result = response.json().await?;
        Ok(result)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<DocumentList> {
        let params: Vec<(&str, String)> =
            queries.iter().map(|q| ("queries[]", q.to_json())).collect();
        let request = self
            .authorize(self.client.get(self.documents_url(collection)))
            .query(&params);
        self.send_json(request).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document> {
        let request = self.authorize(self.client.get(self.document_url(collection, id)));
        self.send_json(request).await
    }

    async fn create_document(&self, collection: &str, data: Data) -> Result<Document> {
        let body = json!({ "documentId": "unique()", "data": user_data(data) });
        let request = self
            .authorize(self.client.post(self.documents_url(collection)))
            .json(&body);
        self.send_json(request).await
    }

    async fn update_document(&self, collection: &str, id: &str, data: Data) -> Result<Document> {
        let body = json!({ "data": user_data(data) });
        let request = self
            .authorize(self.client.patch(self.document_url(collection, id)))
            .json(&body);
        self.send_json(request).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let request = self.authorize(self.client.delete(self.document_url(collection, id)));
        let response = request.send().await?;
        self.check_response(response).await?;
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<Account> {
        let url = format!("{}/account", self.config.endpoint);
        let body = json!({
            "userId": "unique()",
            "email": email,
            "password": password,
            "name": name,
        });
        let request = self
            .client
            .post(&url)
            .header(PROJECT_HEADER, &self.config.project_id)
            .json(&body);
        self.send_json(request).await
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/account/sessions/email", self.config.endpoint);
        let body = json!({ "email": email, "password": password });
        let request = self.authorize(self.client.post(&url)).json(&body);
        self.send_json(request).await
    }

    async fn get_account(&self, session_secret: &str) -> Result<Account> {
        let url = format!("{}/account", self.config.endpoint);
        let request = self.with_session(self.client.get(&url), session_secret);
        self.send_json(request).await
    }

    async fn delete_session(&self, session_secret: &str) -> Result<()> {
        let url = format!("{}/account/sessions/current", self.config.endpoint);
        let request = self.with_session(self.client.delete(&url), session_secret);
        let response = request.send().await?;
        match self.check_response(response).await {
            Ok(_) => Ok(()),
            Err(BackendError::Unauthorized(_)) | Err(BackendError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}
