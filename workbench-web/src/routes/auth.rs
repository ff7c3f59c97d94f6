//! Sign-in, sign-up and sign-out.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde_json::Value;
use tracing::{info, warn};
use workbench_backend::{AuthError, BackendError, Session};
use workbench_entity::{EditView, EntityForm, Flash};
use workbench_fields::{EntityDef, FieldDef, FieldType, Record, ValidationErrors};

use crate::cookies::{clear_cookie, set_cookie};
use crate::error::PageError;
use crate::state::AppState;
use crate::visitor::Visitor;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/register", get(register_form).post(register))
        .route("/logout", post(logout))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthPage {
    Login,
    Register,
}

impl AuthPage {
    fn entity(self) -> EntityDef {
        let email = FieldDef::new("email", FieldType::Email)
            .required()
            .with_placeholder("you@example.com");
        let password = FieldDef::new("password", FieldType::Password).required();
        match self {
            AuthPage::Login => EntityDef::new("login", "account").field(email).field(password),
            AuthPage::Register => EntityDef::new("register", "account")
                .field(FieldDef::new("name", FieldType::Text).required())
                .field(email)
                .field(password),
        }
    }

    fn heading(self) -> &'static str {
        match self {
            AuthPage::Login => "Sign in",
            AuthPage::Register => "Create an account",
        }
    }

    fn action(self) -> &'static str {
        match self {
            AuthPage::Login => "/login",
            AuthPage::Register => "/register",
        }
    }

    fn alternate(self) -> &'static str {
        match self {
            AuthPage::Login => r#"<p>No account yet? <a href="/register">Create one</a>.</p>"#,
            AuthPage::Register => r#"<p>Already registered? <a href="/login">Sign in</a>.</p>"#,
        }
    }

    fn render(
        self,
        state: &AppState,
        visitor: &Visitor,
        initial: Option<Record>,
        errors: ValidationErrors,
        flash: Option<Flash>,
        status: StatusCode,
    ) -> Result<Response, PageError> {
        let entity = self.entity();
        let mut form = EntityForm::new(&entity)
            .with_action(self.action())
            .with_submit_label(self.heading())
            .with_errors(errors);
        if let Some(initial) = initial {
            form = form.with_initial(initial);
        }
        let mut body = state.renderer.edit(&EditView {
            heading: self.heading().to_string(),
            error_summary: None,
            form: form.render(&state.renderer)?,
        })?;
        body.push_str(self.alternate());
        let page = visitor.page(state, self.heading(), None, flash, body)?;
        Ok((status, page).into_response())
    }
}

fn text(record: &Record, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn auth_status(err: &BackendError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Redirect home with the session cookie set.
fn signed_in(state: &AppState, session: &Session) -> Response {
    let cookie = set_cookie(&state.session_cookie, &session.secret, None);
    ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

/// Re-render `page` after the backend refused the credentials.
fn refused(
    page: AuthPage,
    state: &AppState,
    visitor: &Visitor,
    mut record: Record,
    err: BackendError,
) -> Result<Response, PageError> {
    warn!(error = %err, "authentication failed");
    let status = auth_status(&err);
    let message = AuthError::from(err).message;
    record.remove("password");
    page.render(
        state,
        visitor,
        Some(record),
        ValidationErrors::new(),
        Some(Flash::error(message)),
        status,
    )
}

async fn login_form(State(state): State<AppState>, visitor: Visitor) -> Result<Response, PageError> {
    AuthPage::Login.render(&state, &visitor, None, ValidationErrors::new(), None, StatusCode::OK)
}

async fn register_form(
    State(state): State<AppState>,
    visitor: Visitor,
) -> Result<Response, PageError> {
    AuthPage::Register.render(&state, &visitor, None, ValidationErrors::new(), None, StatusCode::OK)
}

async fn login(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let page = AuthPage::Login;
    let entity = page.entity();
    let record = match EntityForm::new(&entity).collect(&pairs) {
        Ok(record) => record,
        Err(errors) => {
            let initial = workbench_entity::pairs_to_record(&pairs);
            return page.render(
                &state,
                &visitor,
                Some(initial),
                errors,
                None,
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    };

    let email = text(&record, "email");
    match state
        .backend
        .create_session(&email, &text(&record, "password"))
        .await
    {
        Ok(session) => {
            info!(user = %session.user_id, "signed in");
            Ok(signed_in(&state, &session))
        }
        Err(err) => refused(page, &state, &visitor, record, err),
    }
}

async fn register(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let page = AuthPage::Register;
    let entity = page.entity();
    let record = match EntityForm::new(&entity).collect(&pairs) {
        Ok(record) => record,
        Err(errors) => {
            let initial = workbench_entity::pairs_to_record(&pairs);
            return page.render(
                &state,
                &visitor,
                Some(initial),
                errors,
                None,
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    };

    let email = text(&record, "email");
    let password = text(&record, "password");
    let created = state
        .backend
        .create_account(&email, &password, &text(&record, "name"))
        .await;
    let account = match created {
        Ok(account) => account,
        Err(err) => return refused(page, &state, &visitor, record, err),
    };
    info!(user = %account.id, "account created");

    match state.backend.create_session(&email, &password).await {
        Ok(session) => Ok(signed_in(&state, &session)),
        Err(err) => refused(AuthPage::Login, &state, &visitor, record, err),
    }
}

/// Ends the session. The cookie is cleared even if the backend call fails.
async fn logout(State(state): State<AppState>, visitor: Visitor) -> Response {
    if let Some(secret) = &visitor.session {
        if let Err(err) = state.backend.delete_session(secret).await {
            warn!(error = %err, "could not delete session");
        }
    }
    let cookie = clear_cookie(&state.session_cookie);
    ([(SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}
