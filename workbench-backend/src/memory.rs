//! In-process backend for local development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;
use ulid::Ulid;

use crate::backend::Backend;
use crate::document::{user_data, Account, Data, Document, DocumentList, Session};
use crate::error::{BackendError, Result};
use crate::query::{self, Query};

const SECRET_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const MIN_PASSWORD_LEN: usize = 8;

fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..SECRET_CHARSET.len());
            SECRET_CHARSET[idx] as char
        })
        .collect()
}

fn new_id() -> String {
    Ulid::new().to_string().to_lowercase()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

struct StoredAccount {
    account: Account,
    salt: String,
    password_hash: String,
}

/// Keeps every collection, account and session in memory.
///
/// Documents keep insertion order, which is the order `list_documents`
/// returns them in when no ordering query is given.
#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, IndexMap<String, Document>>>,
    accounts: RwLock<HashMap<String, StoredAccount>>,
    /// Session secret to session.
    sessions: RwLock<HashMap<String, Session>>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend").finish_non_exhaustive()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<DocumentList> {
        let collections = self.collections.read().await;
        let documents: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        let (total, documents) = query::apply(queries, documents);
        Ok(DocumentList { total, documents })
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("document {id} in {collection}")))
    }

    async fn create_document(&self, collection: &str, data: Data) -> Result<Document> {
        let now = Utc::now();
        let document = Document {
            id: new_id(),
            created_at: now,
            updated_at: now,
            data: user_data(data),
        };
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document.clone());
        debug!(collection, id = %document.id, "created document");
        Ok(document)
    }

    async fn update_document(&self, collection: &str, id: &str, data: Data) -> Result<Document> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| BackendError::NotFound(format!("document {id} in {collection}")))?;
        document.data.extend(user_data(data));
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|docs| docs.shift_remove(id))
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("document {id} in {collection}")))
    }

    async fn create_account(&self, email: &str, password: &str, name: &str) -> Result<Account> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(BackendError::Invalid("Please enter a valid email address.".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::Invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(BackendError::Conflict(format!("account {email} already exists")));
        }
        let salt = random_string(16);
        let account = Account {
            id: new_id(),
            email: email.clone(),
            name: name.trim().to_string(),
        };
        accounts.insert(
            email,
            StoredAccount {
                account: account.clone(),
                password_hash: hash_password(&salt, password),
                salt,
            },
        );
        Ok(account)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let accounts = self.accounts.read().await;
        let stored = accounts
            .get(&email)
            .filter(|stored| stored.password_hash == hash_password(&stored.salt, password))
            .ok_or_else(|| BackendError::Unauthorized("invalid credentials".into()))?;

        let session = Session {
            id: new_id(),
            user_id: stored.account.id.clone(),
            secret: random_string(32),
        };
        self.sessions
            .write()
            .await
            .insert(session.secret.clone(), session.clone());
        Ok(session)
    }

    async fn get_account(&self, session_secret: &str) -> Result<Account> {
        let user_id = self
            .sessions
            .read()
            .await
            .get(session_secret)
            .map(|s| s.user_id.clone())
            .ok_or_else(|| BackendError::Unauthorized("no active session".into()))?;
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .find(|stored| stored.account.id == user_id)
            .map(|stored| stored.account.clone())
            .ok_or_else(|| BackendError::NotFound(format!("account {user_id}")))
    }

    async fn delete_session(&self, session_secret: &str) -> Result<()> {
        self.sessions.write().await.remove(session_secret);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
