//! Clinic dashboard and scheduling queries.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use workbench_backend::Query;
use workbench_fields::{parse_date, DATE_FORMAT};

use super::models::{Appointment, Doctor};
use super::ClinicApi;
use crate::error::{AppError, Result};

/// Days covered by `upcoming_appointments` when the caller gives none.
pub const DEFAULT_UPCOMING_DAYS: u32 = 7;

/// Counts shown on the clinic dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicStats {
    pub total_doctors: u64,
    pub total_patients: u64,
    pub todays_appointments: u64,
    /// Scheduled appointments dated after today.
    pub upcoming_appointments: u64,
    pub completed_appointments: u64,
    pub cancelled_appointments: u64,
}

/// One doctor and their appointments in a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorSchedule {
    pub doctor: Doctor,
    pub appointments: Vec<Appointment>,
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` request parameter.
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    parse_date(value.trim()).ok_or_else(|| AppError::InvalidDate {
        value: value.to_string(),
    })
}

/// Order appointments by date, then time. Equal slots keep their order.
pub fn sort_by_slot(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}

/// Whether an appointment's date falls in `[start, end]`. Missing bounds are open.
fn within(appointment: &Appointment, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(date) = parse_date(&appointment.date) else {
        return false;
    };
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}

#[instrument(skip(api))]
pub async fn dashboard_stats(api: &ClinicApi, today: NaiveDate) -> Result<ClinicStats> {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    let todays = [Query::equal("date", format_date(today))];
    let upcoming = [
        Query::equal("status", "scheduled"),
        Query::greater_equal("date", format_date(tomorrow)),
    ];
    let completed = [Query::equal("status", "completed")];
    let cancelled = [Query::equal("status", "cancelled")];

    let appointments = api.appointments();
    let (
        total_doctors,
        total_patients,
        todays_appointments,
        upcoming_appointments,
        completed_appointments,
        cancelled_appointments,
    ) = tokio::try_join!(
        api.doctors().count(&[]),
        api.patients().count(&[]),
        appointments.count(&todays),
        appointments.count(&upcoming),
        appointments.count(&completed),
        appointments.count(&cancelled),
    )?;

    Ok(ClinicStats {
        total_doctors,
        total_patients,
        todays_appointments,
        upcoming_appointments,
        completed_appointments,
        cancelled_appointments,
    })
}

/// Appointments dated `today`, earliest first.
pub async fn todays_appointments(api: &ClinicApi, today: NaiveDate) -> Result<Vec<Appointment>> {
    let mut appointments = api
        .appointments()
        .fetch_all(&[Query::equal("date", format_date(today))])
        .await?;
    appointments.sort_by(|a, b| a.time.cmp(&b.time));
    Ok(appointments)
}

/// Scheduled appointments from `today` through `today + days`, by date then time.
pub async fn upcoming_appointments(
    api: &ClinicApi,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<Appointment>> {
    let end = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    let mut appointments = api
        .appointments()
        .fetch_all(&[
            Query::equal("status", "scheduled"),
            Query::greater_equal("date", format_date(today)),
            Query::less_equal("date", format_date(end)),
        ])
        .await?;
    appointments.retain(|a| within(a, Some(today), Some(end)));
    sort_by_slot(&mut appointments);
    Ok(appointments)
}

/// A doctor's appointments within `[start, end]` inclusive, by date then time.
///
/// Fails with `NotFound` for an unknown doctor and `InvalidRange` when
/// `start` is after `end`.
#[instrument(skip(api))]
pub async fn doctor_schedule(
    api: &ClinicApi,
    doctor_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DoctorSchedule> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(AppError::InvalidRange {
                start: format_date(s),
                end: format_date(e),
            });
        }
    }

    let doctor = api.doctors().get(doctor_id).await?;

    let mut queries = vec![Query::equal("doctor_id", doctor_id)];
    if let Some(s) = start {
        queries.push(Query::greater_equal("date", format_date(s)));
    }
    if let Some(e) = end {
        queries.push(Query::less_equal("date", format_date(e)));
    }
    let mut appointments = api.appointments().fetch_all(&queries).await?;
    appointments.retain(|a| within(a, start, end));
    sort_by_slot(&mut appointments);
    debug!(count = appointments.len(), "doctor schedule");

    Ok(DoctorSchedule {
        doctor,
        appointments,
    })
}
