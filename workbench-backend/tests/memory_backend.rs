use serde_json::{json, Value};
use workbench_backend::{Backend, BackendError, Data, MemoryBackend, Query};

fn data(value: Value) -> Data {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_document_crud() {
    let backend = MemoryBackend::new();

    let created = backend
        .create_document("doctors", data(json!({"name": "Dr. Grey", "$id": "ignored"})))
        .await
        .unwrap();
    assert_ne!(created.id, "ignored");
    assert_eq!(created.data["name"], "Dr. Grey");

    let fetched = backend.get_document("doctors", &created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = backend
        .update_document("doctors", &created.id, data(json!({"specialty": "Surgery"})))
        .await
        .unwrap();
    assert_eq!(updated.data["name"], "Dr. Grey");
    assert_eq!(updated.data["specialty"], "Surgery");
    assert!(updated.updated_at >= created.updated_at);

    backend.delete_document("doctors", &created.id).await.unwrap();
    let err = backend.get_document("doctors", &created.id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = backend.delete_document("doctors", &created.id).await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound(_)));
}

#[tokio::test]
async fn test_list_applies_queries() {
    let backend = MemoryBackend::new();
    for (doctor, date, time) in [
        ("d1", "2024-03-02", "09:00"),
        ("d2", "2024-03-01", "10:00"),
        ("d1", "2024-03-01", "15:30"),
        ("d1", "2024-03-01", "08:00"),
    ] {
        backend
            .create_document(
                "appointments",
                data(json!({"doctor_id": doctor, "date": date, "time": time})),
            )
            .await
            .unwrap();
    }

    let list = backend
        .list_documents(
            "appointments",
            &[
                Query::equal("doctor_id", "d1"),
                Query::order_asc("date"),
                Query::order_asc("time"),
                Query::limit(2),
            ],
        )
        .await
        .unwrap();
    assert_eq!(list.total, 3);
    let times: Vec<&str> = list
        .documents
        .iter()
        .map(|d| d.data["time"].as_str().unwrap())
        .collect();
    assert_eq!(times, vec!["08:00", "15:30"]);

    let empty = backend.list_documents("nothing", &[]).await.unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.documents.is_empty());
}

#[tokio::test]
async fn test_list_keeps_insertion_order() {
    let backend = MemoryBackend::new();
    for name in ["b", "a", "c"] {
        backend
            .create_document("teams", data(json!({"name": name})))
            .await
            .unwrap();
    }
    let list = backend.list_documents("teams", &[]).await.unwrap();
    let names: Vec<&str> = list
        .documents
        .iter()
        .map(|d| d.data["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[tokio::test]
async fn test_account_lifecycle() {
    let backend = MemoryBackend::new();

    let account = backend
        .create_account("Nurse@Example.com", "correct horse", "Nurse Joy")
        .await
        .unwrap();
    assert_eq!(account.email, "nurse@example.com");

    let err = backend
        .create_account("nurse@example.com", "another password", "Joy")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Conflict(_)));

    let err = backend
        .create_session("nurse@example.com", "wrong password")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Unauthorized(_)));

    let session = backend
        .create_session("nurse@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(session.user_id, account.id);
    assert_eq!(session.secret.len(), 32);

    let me = backend.get_account(&session.secret).await.unwrap();
    assert_eq!(me, account);

    backend.delete_session(&session.secret).await.unwrap();
    let err = backend.get_account(&session.secret).await.unwrap_err();
    assert!(matches!(err, BackendError::Unauthorized(_)));

    backend.delete_session(&session.secret).await.unwrap();
}

#[tokio::test]
async fn test_account_validation() {
    let backend = MemoryBackend::new();
    let err = backend
        .create_account("not-an-email", "long enough", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Invalid(_)));

    let err = backend
        .create_account("a@b.c", "short", "x")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid request: Password must be at least 8 characters."
    );
}
