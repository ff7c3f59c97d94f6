//! Typed CRUD over one backend collection.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use workbench_backend::{Backend, Data, Document, Query};

use crate::error::{AppError, Result};

/// Documents requested per page.
pub const PAGE_SIZE: usize = 100;

/// One function per verb for a single collection.
///
/// `T` is the model documents decode into. Use
/// [`Record`](workbench_fields::Record) for untyped access.
pub struct Collection<T> {
    backend: Arc<dyn Backend>,
    id: String,
    _model: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            id: self.id.clone(),
            _model: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("id", &self.id).finish()
    }
}

impl<T: DeserializeOwned> Collection<T> {
    pub fn new(backend: Arc<dyn Backend>, id: impl Into<String>) -> Self {
        Self {
            backend,
            id: id.into(),
            _model: PhantomData,
        }
    }

    /// Backend collection id.
    pub fn id(&self) -> &str {
        &self.id
    }

    fn decode(&self, document: Document) -> Result<T> {
        document
            .into_typed()
            .map_err(|source| AppError::Decode {
                collection: self.id.clone(),
                source,
            })
    }

    fn encode<S: Serialize + ?Sized>(&self, data: &S) -> Result<Data> {
        match serde_json::to_value(data) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(AppError::InvalidData {
                collection: self.id.clone(),
            }),
        }
    }

    /// One page of matching documents.
    ///
    /// At most [`PAGE_SIZE`] documents come back unless `queries` carries its
    /// own limit.
    pub async fn fetch(&self, queries: &[Query]) -> Result<Vec<T>> {
        let mut queries = queries.to_vec();
        if !queries.iter().any(|q| matches!(q, Query::Limit(_))) {
            queries.push(Query::limit(PAGE_SIZE));
        }
        let list = self.backend.list_documents(&self.id, &queries).await?;
        list.documents
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    /// Every matching document, fetched page by page.
    ///
    /// Limit and offset queries in `queries` are ignored.
    #[instrument(skip(self, queries), fields(collection = %self.id))]
    pub async fn fetch_all(&self, queries: &[Query]) -> Result<Vec<T>> {
        let base: Vec<Query> = queries
            .iter()
            .filter(|q| !matches!(q, Query::Limit(_) | Query::Offset(_)))
            .cloned()
            .collect();

        let mut items = Vec::new();
        let mut offset = 0usize;
        loop {
            let mut page_queries = base.clone();
            page_queries.push(Query::limit(PAGE_SIZE));
            page_queries.push(Query::offset(offset));
            let list = self.backend.list_documents(&self.id, &page_queries).await?;
            let received = list.documents.len();
            for doc in list.documents {
                items.push(self.decode(doc)?);
            }
            offset += received;
            if received < PAGE_SIZE || offset as u64 >= list.total {
                break;
            }
        }
        debug!(count = items.len(), "fetched all documents");
        Ok(items)
    }

    /// Number of matching documents.
    pub async fn count(&self, queries: &[Query]) -> Result<u64> {
        let mut queries: Vec<Query> = queries
            .iter()
            .filter(|q| !matches!(q, Query::Limit(_) | Query::Offset(_)))
            .cloned()
            .collect();
        queries.push(Query::limit(1));
        Ok(self.backend.list_documents(&self.id, &queries).await?.total)
    }

    pub async fn get(&self, id: &str) -> Result<T> {
        match self.backend.get_document(&self.id, id).await {
            Ok(doc) => self.decode(doc),
            Err(e) if e.is_not_found() => Err(AppError::not_found(&self.id, id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a new document. `$`-prefixed keys in `data` are ignored.
    pub async fn create<S: Serialize + ?Sized>(&self, data: &S) -> Result<T> {
        let data = self.encode(data)?;
        let doc = self.backend.create_document(&self.id, data).await?;
        debug!(collection = %self.id, id = %doc.id, "created");
        self.decode(doc)
    }

    /// Merge `data` into an existing document.
    pub async fn update<S: Serialize + ?Sized>(&self, id: &str, data: &S) -> Result<T> {
        let data = self.encode(data)?;
        match self.backend.update_document(&self.id, id, data).await {
            Ok(doc) => self.decode(doc),
            Err(e) if e.is_not_found() => Err(AppError::not_found(&self.id, id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        match self.backend.delete_document(&self.id, id).await {
            Ok(()) => {
                debug!(collection = %self.id, id, "deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(AppError::not_found(&self.id, id)),
            Err(e) => Err(e.into()),
        }
    }
}
