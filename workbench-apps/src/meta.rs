//! System attributes every stored document carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `$id`, `$createdAt` and `$updatedAt`. Flattened into every model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
}
