//! The `Backend` trait: everything the apps need from the hosted service.

use async_trait::async_trait;

use crate::document::{Account, Data, Document, DocumentList, Session};
use crate::error::Result;
use crate::query::Query;

/// Document storage and account management.
///
/// Collections are addressed by id. Implementations must be shareable across
/// request handlers.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List documents matching all `queries`.
    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<DocumentList>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document>;

    /// Create a document with a backend-assigned id.
    async fn create_document(&self, collection: &str, data: Data) -> Result<Document>;

    /// Merge `data` into an existing document.
    async fn update_document(&self, collection: &str, id: &str, data: Data) -> Result<Document>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()>;

    /// Register a new account. Fails with `Conflict` if the email is taken.
    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<Account>;

    /// Sign in with email and password.
    async fn create_session(&self, email: &str, password: &str) -> Result<Session>;

    /// The account owning a session secret.
    async fn get_account(&self, session_secret: &str) -> Result<Account>;

    /// Sign out. Deleting an unknown session is not an error.
    async fn delete_session(&self, session_secret: &str) -> Result<()>;

    /// Short name for logs.
    fn kind(&self) -> &'static str;
}
