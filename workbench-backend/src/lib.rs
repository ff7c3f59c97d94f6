//! Backend-as-a-service client
//!
//! The apps store their records as documents in named collections and sign
//! users in through the same service. [`Backend`] is the seam: [`HttpBackend`]
//! talks to the hosted REST API, [`MemoryBackend`] keeps everything in
//! process for local development and tests.

pub mod backend;
pub mod document;
pub mod error;
pub mod http;
pub mod memory;
pub mod query;

pub use backend::Backend;
pub use document::{user_data, Account, Data, Document, DocumentList, Session};
pub use error::{AuthError, BackendError, Result};
pub use http::{HttpBackend, HttpBackendConfig};
pub use memory::MemoryBackend;
pub use query::Query;
