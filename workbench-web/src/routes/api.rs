//! JSON routes under `/api`.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::instrument;
use workbench_apps::clinic::services::{parse_day, DEFAULT_UPCOMING_DAYS};
use workbench_apps::clinic::{self, Appointment, ClinicStats, DoctorSchedule};
use workbench_apps::esports::{self, EsportsStats, Standing};

use crate::cache::Cached;
use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clinic/dashboard/stats", get(clinic_stats))
        .route("/clinic/appointments/today", get(todays_appointments))
        .route("/clinic/appointments/upcoming", get(upcoming_appointments))
        .route("/clinic/doctors/:id/schedule", get(doctor_schedule))
        .route("/esports/dashboard/stats", get(esports_stats))
        .route("/esports/tournaments/:id/standings", get(standings))
}

/// Non-empty value of a query parameter.
fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

async fn clinic_stats(State(state): State<AppState>) -> ApiResult<Cached<ClinicStats>> {
    let today = state.today();
    let stats = state
        .clinic_stats
        .get_or_fetch(|| clinic::dashboard_stats(&state.clinic, today))
        .await?;
    Ok(Json(stats))
}

async fn esports_stats(State(state): State<AppState>) -> ApiResult<Cached<EsportsStats>> {
    let today = state.today();
    let stats = state
        .esports_stats
        .get_or_fetch(|| esports::dashboard_stats(&state.esports, today))
        .await?;
    Ok(Json(stats))
}

async fn todays_appointments(State(state): State<AppState>) -> ApiResult<Vec<Appointment>> {
    let appointments = clinic::todays_appointments(&state.clinic, state.today()).await?;
    Ok(Json(appointments))
}

async fn upcoming_appointments(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Appointment>> {
    let days = match param(&params, "days") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::bad_request(format!("invalid days: {raw}")))?,
        None => DEFAULT_UPCOMING_DAYS,
    };
    let appointments = clinic::upcoming_appointments(&state.clinic, state.today(), days).await?;
    Ok(Json(appointments))
}

#[instrument(skip(state, params))]
async fn doctor_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<DoctorSchedule> {
    let start = param(&params, "start").map(parse_day).transpose()?;
    let end = param(&params, "end").map(parse_day).transpose()?;
    let schedule = clinic::doctor_schedule(&state.clinic, &id, start, end).await?;
    Ok(Json(schedule))
}

async fn standings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Standing>> {
    Ok(Json(esports::standings(&state.esports, &id).await?))
}
