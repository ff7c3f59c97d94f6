//! List queries: filters, ordering and pagination.
//!
//! Queries serialize to the backend's JSON query syntax
//! (`{"method":"equal","attribute":"status","values":["scheduled"]}`) and can
//! also be evaluated locally against documents.

use std::cmp::Ordering;

use serde_json::{json, Value};

use crate::document::Document;

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, Value),
    NotEqual(String, Value),
    GreaterEqual(String, Value),
    LessEqual(String, Value),
    OrderAsc(String),
    OrderDesc(String),
    Limit(usize),
    Offset(usize),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal(attribute.into(), value.into())
    }

    pub fn not_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::NotEqual(attribute.into(), value.into())
    }

    pub fn greater_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::GreaterEqual(attribute.into(), value.into())
    }

    pub fn less_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::LessEqual(attribute.into(), value.into())
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Query::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    pub fn limit(n: usize) -> Self {
        Query::Limit(n)
    }

    pub fn offset(n: usize) -> Self {
        Query::Offset(n)
    }

    /// JSON form sent in `queries[]` parameters.
    pub fn to_json(&self) -> String {
        let value = match self {
            Query::Equal(a, v) => json!({"method": "equal", "attribute": a, "values": [v]}),
            Query::NotEqual(a, v) => json!({"method": "notEqual", "attribute": a, "values": [v]}),
            Query::GreaterEqual(a, v) => {
                json!({"method": "greaterThanEqual", "attribute": a, "values": [v]})
            }
            Query::LessEqual(a, v) => {
                json!({"method": "lessThanEqual", "attribute": a, "values": [v]})
            }
            Query::OrderAsc(a) => json!({"method": "orderAsc", "attribute": a}),
            Query::OrderDesc(a) => json!({"method": "orderDesc", "attribute": a}),
            Query::Limit(n) => json!({"method": "limit", "values": [n]}),
            Query::Offset(n) => json!({"method": "offset", "values": [n]}),
        };
        value.to_string()
    }

    /// Whether a document passes this query. Non-filter queries always pass.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Query::Equal(a, v) => doc.attribute(a).as_ref() == Some(v),
            Query::NotEqual(a, v) => doc.attribute(a).as_ref() != Some(v),
            Query::GreaterEqual(a, v) => doc
                .attribute(a)
                .is_some_and(|x| compare(&x, v) != Ordering::Less),
            Query::LessEqual(a, v) => doc
                .attribute(a)
                .is_some_and(|x| compare(&x, v) != Ordering::Greater),
            Query::OrderAsc(_) | Query::OrderDesc(_) | Query::Limit(_) | Query::Offset(_) => true,
        }
    }
}

/// Apply filters, ordering and pagination to documents.
///
/// Returns the matches before pagination and the page itself.
pub fn apply(queries: &[Query], documents: Vec<Document>) -> (u64, Vec<Document>) {
    let mut matched: Vec<Document> = documents
        .into_iter()
        .filter(|doc| queries.iter().all(|q| q.matches(doc)))
        .collect();
    let total = matched.len() as u64;

    // Earlier order queries take precedence.
    let orders: Vec<(&str, bool)> = queries
        .iter()
        .filter_map(|q| match q {
            Query::OrderAsc(a) => Some((a.as_str(), true)),
            Query::OrderDesc(a) => Some((a.as_str(), false)),
            _ => None,
        })
        .collect();
    if !orders.is_empty() {
        matched.sort_by(|x, y| {
            for (attribute, ascending) in &orders {
                let ordering = match (x.attribute(attribute), y.attribute(attribute)) {
                    (Some(a), Some(b)) => compare(&a, &b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                let ordering = if *ascending { ordering } else { ordering.reverse() };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    let offset = queries
        .iter()
        .rev()
        .find_map(|q| match q {
            Query::Offset(n) => Some(*n),
            _ => None,
        })
        .unwrap_or(0);
    let limit = queries.iter().rev().find_map(|q| match q {
        Query::Limit(n) => Some(*n),
        _ => None,
    });

    let page = matched
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    (total, page)
}

/// Order two JSON values: numbers numerically, everything else by string form.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(id: &str, date: &str, time: &str, fee: i64) -> Document {
        let data = json!({"date": date, "time": time, "fee": fee, "doctor_id": "d1"});
        Document {
            id: id.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            data: data.as_object().unwrap().clone(),
        }
    }

    fn docs() -> Vec<Document> {
        vec![
            doc("a", "2024-03-02", "09:00", 50),
            doc("b", "2024-03-01", "14:00", 120),
            doc("c", "2024-03-01", "08:30", 80),
            doc("d", "2024-03-05", "10:00", 40),
        ]
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn serializes_query_syntax() {
        assert_eq!(
            Query::equal("status", "scheduled").to_json(),
            r#"{"attribute":"status","method":"equal","values":["scheduled"]}"#
        );
        assert_eq!(Query::limit(25).to_json(), r#"{"method":"limit","values":[25]}"#);
        assert_eq!(
            Query::order_desc("$createdAt").to_json(),
            r#"{"attribute":"$createdAt","method":"orderDesc"}"#
        );
    }

    #[test]
    fn filters_and_multi_key_order() {
        let queries = vec![
            Query::greater_equal("date", "2024-03-01"),
            Query::less_equal("date", "2024-03-02"),
            Query::order_asc("date"),
            Query::order_asc("time"),
        ];
        let (total, page) = apply(&queries, docs());
        assert_eq!(total, 3);
        assert_eq!(ids(&page), vec!["c", "b", "a"]);
    }

    #[test]
    fn numeric_comparison_and_pagination() {
        let queries = vec![
            Query::greater_equal("fee", 50),
            Query::order_desc("fee"),
            Query::offset(1),
            Query::limit(1),
        ];
        let (total, page) = apply(&queries, docs());
        assert_eq!(total, 3);
        assert_eq!(ids(&page), vec!["c"]);
    }

    #[test]
    fn equality_on_system_attribute() {
        let (total, page) = apply(&[Query::equal("$id", "d")], docs());
        assert_eq!(total, 1);
        assert_eq!(ids(&page), vec!["d"]);

        let (total, _) = apply(&[Query::not_equal("doctor_id", "d1")], docs());
        assert_eq!(total, 0);
    }
}
