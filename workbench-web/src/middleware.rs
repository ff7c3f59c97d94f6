//! Session-cookie route guard.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::cookies::cookie_value;
use crate::state::AppState;

const PROTECTED_PREFIXES: &[&str] = &["/esports", "/clinic"];
const GUEST_ONLY: &[&str] = &["/login", "/register"];

/// Where to send a request instead, if anywhere.
///
/// Only the presence of the session cookie is considered; the session itself
/// is not checked against the backend.
pub fn redirect_for(path: &str, has_session: bool) -> Option<&'static str> {
    let protected = PROTECTED_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    });
    if protected && !has_session {
        return Some("/login");
    }
    if has_session && GUEST_ONLY.contains(&path) {
        return Some("/");
    }
    None
}

pub async fn session_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let has_session = cookie_value(request.headers(), &state.session_cookie).is_some();
    match redirect_for(request.uri().path(), has_session) {
        Some(target) => {
            debug!(path = %request.uri().path(), target, "redirecting");
            Redirect::to(target).into_response()
        }
        None => next.run(request).await,
    }
}
