//! Stored documents and account types, in the backend's wire shape.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document body: attribute name to value.
pub type Data = Map<String, Value>;

/// One stored record.
///
/// System attributes use the backend's `$`-prefixed names on the wire. Any
/// other `$` attributes the backend sends (`$collectionId`, `$permissions`,
/// ...) are dropped on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten, deserialize_with = "deserialize_user_data")]
    pub data: Data,
}

fn deserialize_user_data<'de, D>(deserializer: D) -> std::result::Result<Data, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut data = Data::deserialize(deserializer)?;
    data.retain(|k, _| !k.starts_with('$'));
    Ok(data)
}

impl Document {
    /// Flatten into a single map: user data plus `$id`, `$createdAt`, `$updatedAt`.
    pub fn to_record(&self) -> Data {
        let mut record = self.data.clone();
        record.insert("$id".into(), Value::String(self.id.clone()));
        record.insert(
            "$createdAt".into(),
            Value::String(self.created_at.to_rfc3339()),
        );
        record.insert(
            "$updatedAt".into(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        record
    }

    /// Deserialize into a typed model. The model sees the same keys as `to_record`.
    pub fn into_typed<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.to_record()))
    }

    /// Value of an attribute, including the system attributes.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "$id" => Some(Value::String(self.id.clone())),
            "$createdAt" => Some(Value::String(self.created_at.to_rfc3339())),
            "$updatedAt" => Some(Value::String(self.updated_at.to_rfc3339())),
            other => self.data.get(other).cloned(),
        }
    }
}

/// Strip `$`-prefixed keys before sending data to the backend.
pub fn user_data(mut data: Data) -> Data {
    data.retain(|k, _| !k.starts_with('$'));
    data
}

/// One page of documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentList {
    /// Matches before `limit`/`offset` were applied.
    pub total: u64,
    pub documents: Vec<Document>,
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// A signed-in session. `secret` goes into the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire() -> Value {
        json!({
            "$id": "d1",
            "$createdAt": "2024-03-01T09:00:00.000+00:00",
            "$updatedAt": "2024-03-02T10:30:00.000+00:00",
            "$collectionId": "doctors",
            "$permissions": [],
            "name": "Dr. Grey",
            "specialty": "Surgery"
        })
    }

    #[test]
    fn deserializes_wire_shape_and_drops_system_extras() {
        let doc: Document = serde_json::from_value(wire()).unwrap();
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.data.len(), 2);
        assert_eq!(doc.data["name"], "Dr. Grey");
        assert!(!doc.data.contains_key("$collectionId"));
    }

    #[test]
    fn to_record_includes_system_attributes() {
        let doc: Document = serde_json::from_value(wire()).unwrap();
        let record = doc.to_record();
        assert_eq!(record["$id"], "d1");
        assert!(record["$createdAt"].as_str().unwrap().starts_with("2024-03-01T09:00:00"));
        assert_eq!(doc.attribute("$id"), Some(json!("d1")));
        assert_eq!(doc.attribute("specialty"), Some(json!("Surgery")));
        assert_eq!(doc.attribute("missing"), None);
    }

    #[test]
    fn into_typed() {
        #[derive(Deserialize)]
        struct Doctor {
            #[serde(rename = "$id")]
            id: String,
            name: String,
        }
        let doc: Document = serde_json::from_value(wire()).unwrap();
        let doctor: Doctor = doc.into_typed().unwrap();
        assert_eq!(doctor.id, "d1");
        assert_eq!(doctor.name, "Dr. Grey");
    }

    #[test]
    fn user_data_strips_system_keys() {
        let data = json!({"$id": "x", "name": "n"}).as_object().unwrap().clone();
        let cleaned = user_data(data);
        assert_eq!(cleaned.len(), 1);
        assert!(cleaned.contains_key("name"));
    }
}
