use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use workbench_apps::clinic::{self, AppointmentStatus};
use workbench_apps::{AppError, ClinicApi};
use workbench_backend::{Backend, MemoryBackend};
use workbench_config::CollectionIds;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn seeded() -> (ClinicApi, String, String) {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
    let api = ClinicApi::new(backend, &CollectionIds::default());

    let grey = api
        .doctors()
        .create(&json!({"name": "Dr. Grey", "specialty": "Surgery"}))
        .await
        .unwrap();
    let house = api
        .doctors()
        .create(&json!({"name": "Dr. House", "specialty": "Diagnostics"}))
        .await
        .unwrap();
    let patient = api
        .patients()
        .create(&json!({"name": "Ana"}))
        .await
        .unwrap();

    for (doctor, date, time, status) in [
        (&grey, "2024-03-04", "14:00", "scheduled"),
        (&grey, "2024-03-04", "09:30", "scheduled"),
        (&house, "2024-03-04", "08:15", "completed"),
        (&grey, "2024-03-01", "10:00", "completed"),
        (&grey, "2024-03-06", "11:00", "scheduled"),
        (&grey, "2024-03-05", "16:45", "cancelled"),
        (&grey, "2024-03-05", "08:00", "scheduled"),
        (&house, "2024-03-20", "12:00", "scheduled"),
    ] {
        api.appointments()
            .create(&json!({
                "patient_id": patient.meta.id,
                "doctor_id": doctor.meta.id,
                "date": date,
                "time": time,
                "status": status,
            }))
            .await
            .unwrap();
    }
    (api, grey.meta.id, house.meta.id)
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (api, _, _) = seeded().await;
    let stats = clinic::dashboard_stats(&api, day("2024-03-04")).await.unwrap();
    assert_eq!(stats.total_doctors, 2);
    assert_eq!(stats.total_patients, 1);
    assert_eq!(stats.todays_appointments, 3);
    assert_eq!(stats.upcoming_appointments, 3);
    assert_eq!(stats.completed_appointments, 2);
    assert_eq!(stats.cancelled_appointments, 1);
}

#[tokio::test]
async fn test_todays_appointments_sorted_by_time() {
    let (api, _, _) = seeded().await;
    let today = clinic::todays_appointments(&api, day("2024-03-04")).await.unwrap();
    let times: Vec<&str> = today.iter().map(|a| a.time.as_str()).collect();
    assert_eq!(times, vec!["08:15", "09:30", "14:00"]);
}

#[tokio::test]
async fn test_upcoming_appointments_window() {
    let (api, _, _) = seeded().await;
    let upcoming = clinic::upcoming_appointments(&api, day("2024-03-04"), 2)
        .await
        .unwrap();
    let slots: Vec<(&str, &str)> = upcoming
        .iter()
        .map(|a| (a.date.as_str(), a.time.as_str()))
        .collect();
    assert_eq!(
        slots,
        vec![
            ("2024-03-04", "09:30"),
            ("2024-03-04", "14:00"),
            ("2024-03-05", "08:00"),
            ("2024-03-06", "11:00"),
        ]
    );
    assert!(upcoming
        .iter()
        .all(|a| a.status == AppointmentStatus::Scheduled));
}

#[tokio::test]
async fn test_doctor_schedule_inclusive_range() {
    let (api, grey, _) = seeded().await;
    let schedule = clinic::doctor_schedule(
        &api,
        &grey,
        Some(day("2024-03-04")),
        Some(day("2024-03-05")),
    )
    .await
    .unwrap();
    assert_eq!(schedule.doctor.name, "Dr. Grey");
    let slots: Vec<(&str, &str)> = schedule
        .appointments
        .iter()
        .map(|a| (a.date.as_str(), a.time.as_str()))
        .collect();
    assert_eq!(
        slots,
        vec![
            ("2024-03-04", "09:30"),
            ("2024-03-04", "14:00"),
            ("2024-03-05", "08:00"),
            ("2024-03-05", "16:45"),
        ]
    );
}

#[tokio::test]
async fn test_doctor_schedule_open_bounds() {
    let (api, grey, house) = seeded().await;
    let all = clinic::doctor_schedule(&api, &grey, None, None).await.unwrap();
    assert_eq!(all.appointments.len(), 6);
    assert_eq!(all.appointments[0].date, "2024-03-01");

    let from = clinic::doctor_schedule(&api, &house, Some(day("2024-03-05")), None)
        .await
        .unwrap();
    assert_eq!(from.appointments.len(), 1);
    assert_eq!(from.appointments[0].date, "2024-03-20");
}

#[tokio::test]
async fn test_doctor_schedule_errors() {
    let (api, grey, _) = seeded().await;
    let err = clinic::doctor_schedule(&api, "nobody", None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);

    let err = clinic::doctor_schedule(
        &api,
        &grey,
        Some(day("2024-03-05")),
        Some(day("2024-03-04")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidRange { .. }));
}

#[tokio::test]
async fn test_fetch_appointments_for_patient() {
    let (api, grey, _) = seeded().await;
    let for_doctor = api.fetch_appointments_for_doctor(&grey).await.unwrap();
    assert_eq!(for_doctor.len(), 6);
    let patient_id = for_doctor[0].patient_id.clone();
    let for_patient = api.fetch_appointments_for_patient(&patient_id).await.unwrap();
    assert_eq!(for_patient.len(), 8);
}
