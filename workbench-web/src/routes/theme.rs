//! Theme picker endpoint.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;
use tracing::debug;

use crate::cookies::{set_cookie, LONG_LIVED};
use crate::state::AppState;
use crate::theme::THEME_COOKIE;

pub fn routes() -> Router<AppState> {
    Router::new().route("/theme", post(set_theme))
}

#[derive(Debug, Deserialize)]
struct ThemeForm {
    theme: String,
    #[serde(default)]
    return_to: Option<String>,
}

/// Only same-site paths are followed.
fn safe_return(target: Option<&str>) -> &str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

async fn set_theme(State(state): State<AppState>, Form(form): Form<ThemeForm>) -> Response {
    let theme = state.themes.resolve(Some(form.theme.as_str()));
    debug!(requested = %form.theme, theme = theme.name, "theme selected");
    let cookie = set_cookie(THEME_COOKIE, theme.name, Some(LONG_LIVED));
    let target = safe_return(form.return_to.as_deref());
    ([(SET_COOKIE, cookie)], Redirect::to(target)).into_response()
}
