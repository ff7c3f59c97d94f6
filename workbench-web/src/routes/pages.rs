//! HTML pages: home, app dashboards and entity CRUD.

use std::collections::{BTreeSet, HashMap};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use workbench_apps::clinic::{self, schema::APPOINTMENT};
use workbench_apps::esports::{self, schema::TOURNAMENT};
use workbench_apps::{AppError, Collection};
use workbench_backend::Query as BackendQuery;
use workbench_entity::{
    escape, escape_js, pairs_to_record, Column, DashboardSection, DashboardView, DetailRow,
    DetailView, EditView, EntityForm, EntityTable, Flash, ListingView, ReferenceOption, RowActions,
    SortDirection, SortState, StatCard, SubmitError,
};
use workbench_fields::{EntityDef, FieldDef, FieldType, Record, ValidationErrors};

use crate::error::PageError;
use crate::state::{AppHandle, AppState};
use crate::visitor::{plural, Visitor};

type PageResult = Result<Response, PageError>;

/// Reference choices per target entity name.
type References = HashMap<String, Vec<ReferenceOption>>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/:app", get(dashboard))
        .route("/:app/:entity", get(list).post(create))
        .route("/:app/:entity/new", get(new_form))
        .route("/:app/:entity/:id", get(show).post(update))
        .route("/:app/:entity/:id/edit", get(edit_form))
        .route("/:app/:entity/:id/delete", post(delete))
}

fn resolve<'a>(
    state: &'a AppState,
    app: &str,
    entity: &str,
) -> Result<(&'a AppHandle, &'a EntityDef, &'a Collection<Record>), PageError> {
    let handle = state
        .app(app)
        .ok_or_else(|| PageError::not_found(format!("app '{app}'")))?;
    let (def, collection) = handle
        .entity(entity)
        .ok_or_else(|| PageError::not_found(format!("entity '{entity}'")))?;
    Ok((handle, def, collection))
}

fn record_id(record: &Record) -> &str {
    record.get("$id").and_then(Value::as_str).unwrap_or_default()
}

fn entity_href(app: &AppHandle, def: &EntityDef) -> String {
    format!("/{}/{}", app.name, def.name)
}

fn record_href(app: &AppHandle, def: &EntityDef, id: &str) -> String {
    format!("{}/{}", entity_href(app, def), urlencoding::encode(id))
}

fn to_record<T: Serialize>(item: &T) -> Record {
    match serde_json::to_value(item) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}

/// Load id/title choices for every entity `def` references.
async fn load_references(app: &AppHandle, def: &EntityDef) -> Result<References, AppError> {
    let targets: BTreeSet<&str> = def
        .fields
        .iter()
        .filter_map(|f| match &f.type_ {
            FieldType::Reference { entity } => Some(entity.as_str()),
            _ => None,
        })
        .collect();

    let loads = targets.into_iter().filter_map(|name| match app.entity(name) {
        Some(found) => Some((name, found)),
        None => {
            warn!(app = %app.name, entity = name, "reference to unknown entity");
            None
        }
    });
    let loads = loads.map(|(name, (target, collection))| async move {
        let records = collection.fetch_all(&[]).await?;
        let mut options: Vec<ReferenceOption> = records
            .iter()
            .map(|r| ReferenceOption::new(record_id(r), target.record_title(r)))
            .collect();
        options.sort_by_key(|o| o.label.to_lowercase());
        Ok::<_, AppError>((name.to_string(), options))
    });
    Ok(try_join_all(loads).await?.into_iter().collect())
}

fn field_column(field: &FieldDef, refs: &References) -> Column {
    match &field.type_ {
        FieldType::Reference { entity } => {
            let names = refs
                .get(entity)
                .map(|opts| {
                    opts.iter()
                        .map(|o| (o.id.clone(), o.label.clone()))
                        .collect()
                })
                .unwrap_or_default();
            Column::reference(field, names)
        }
        _ => Column::from_field(field),
    }
}

fn table_columns(def: &EntityDef, refs: &References) -> Vec<Column> {
    def.fields
        .iter()
        .filter(|f| !f.hidden_in_table && !matches!(f.type_, FieldType::Password))
        .map(|f| field_column(f, refs))
        .collect()
}

fn parse_sort(params: &HashMap<String, String>) -> Option<SortState> {
    let key = params.get("sort").filter(|k| !k.is_empty())?;
    let direction = match params.get("dir").map(String::as_str) {
        Some("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    Some(SortState {
        key: key.clone(),
        direction,
    })
}

async fn home(State(state): State<AppState>, visitor: Visitor) -> PageResult {
    let body = if visitor.signed_in() {
        let cards = state
            .apps
            .iter()
            .map(|app| StatCard {
                label: app.label.clone(),
                value: format!("{} record types", app.schema.entities().len()),
                href: Some(app.href()),
            })
            .collect();
        state.renderer.dashboard(&DashboardView {
            heading: "Workbench".into(),
            cards,
            sections: Vec::new(),
        })?
    } else {
        "<h1>Workbench</h1>\n<p>Manage esports tournaments and clinic appointments.</p>\n\
         <p><a class=\"button\" href=\"/login\">Sign in</a> <a href=\"/register\">Create an account</a></p>"
            .to_string()
    };
    Ok(visitor.page(&state, "Workbench", None, None, body)?.into_response())
}

async fn dashboard(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(app): Path<String>,
) -> PageResult {
    let handle = state
        .app(&app)
        .ok_or_else(|| PageError::not_found(format!("app '{app}'")))?;
    let view = match handle.name.as_str() {
        "clinic" => clinic_dashboard(&state, handle).await?,
        "esports" => esports_dashboard(&state, handle).await?,
        _ => return Err(PageError::not_found(format!("app '{app}'"))),
    };
    let body = state.renderer.dashboard(&view)?;
    let title = format!("{} dashboard", handle.label);
    Ok(visitor
        .page(&state, title, Some(handle), None, body)?
        .into_response())
}

fn card(label: &str, value: u64, href: Option<String>) -> StatCard {
    StatCard {
        label: label.to_string(),
        value: value.to_string(),
        href,
    }
}

async fn clinic_dashboard(state: &AppState, app: &AppHandle) -> Result<DashboardView, PageError> {
    let today = state.today();
    let cached = state
        .clinic_stats
        .get_or_fetch(|| clinic::dashboard_stats(&state.clinic, today))
        .await?;
    let stats = cached.stats;
    let cards = vec![
        card("Doctors", stats.total_doctors, Some("/clinic/doctor".into())),
        card("Patients", stats.total_patients, Some("/clinic/patient".into())),
        card("Today's appointments", stats.todays_appointments, None),
        card("Upcoming", stats.upcoming_appointments, Some("/clinic/appointment".into())),
        card("Completed", stats.completed_appointments, None),
        card("Cancelled", stats.cancelled_appointments, None),
    ];

    let mut sections = Vec::new();
    if let Some((def, _)) = app.entity(APPOINTMENT) {
        let appointments = clinic::todays_appointments(&state.clinic, today).await?;
        let refs = load_references(app, def).await?;
        let table = EntityTable::new(
            table_columns(def, &refs),
            appointments.iter().map(to_record).collect(),
        )
        .with_actions(RowActions::all(entity_href(app, def)))
        .with_empty_message("No appointments today.")
        .render(&state.renderer)?;
        sections.push(DashboardSection {
            heading: "Today's appointments".into(),
            body: table,
        });
    }

    Ok(DashboardView {
        heading: "Clinic".into(),
        cards,
        sections,
    })
}

async fn esports_dashboard(state: &AppState, app: &AppHandle) -> Result<DashboardView, PageError> {
    let today = state.today();
    let cached = state
        .esports_stats
        .get_or_fetch(|| esports::dashboard_stats(&state.esports, today))
        .await?;
    let stats = cached.stats;
    let cards = vec![
        card("Tournaments", stats.total_tournaments, Some("/esports/tournament".into())),
        card("Teams", stats.total_teams, Some("/esports/team".into())),
        card("Players", stats.total_players, Some("/esports/player".into())),
        card("Matches", stats.total_matches, Some("/esports/match".into())),
        card("Ongoing tournaments", stats.ongoing_tournaments, None),
        card("Upcoming matches", stats.upcoming_matches, None),
    ];

    let mut sections = Vec::new();
    if let Some((def, collection)) = app.entity(TOURNAMENT) {
        let ongoing = collection
            .fetch_all(&[BackendQuery::equal("status", "ongoing")])
            .await?;
        let table = EntityTable::new(table_columns(def, &References::new()), ongoing)
            .with_sort(Some(SortState::asc("name")))
            .with_actions(RowActions::all(entity_href(app, def)))
            .with_empty_message("No tournaments in progress.")
            .render(&state.renderer)?;
        sections.push(DashboardSection {
            heading: "Ongoing tournaments".into(),
            body: table,
        });
    }

    Ok(DashboardView {
        heading: "Esports".into(),
        cards,
        sections,
    })
}

async fn list(
    State(state): State<AppState>,
    visitor: Visitor,
    Path((app, entity)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> PageResult {
    let (app, def, collection) = resolve(&state, &app, &entity)?;
    let (records, refs) =
        futures::try_join!(collection.fetch_all(&[]), load_references(app, def))?;

    let base = entity_href(app, def);
    let label = def.display_label();
    let table = EntityTable::new(table_columns(def, &refs), records)
        .with_sort(parse_sort(&params))
        .with_sort_links(base.clone())
        .with_actions(
            RowActions::all(base.clone())
                .with_confirm_message(format!("Delete this {}?", label.to_lowercase())),
        )
        .with_empty_message(format!("No {} yet.", plural(&label).to_lowercase()))
        .render(&state.renderer)?;
    let body = state.renderer.listing(&ListingView {
        heading: plural(&label),
        entity_label: label.clone(),
        new_href: Some(format!("{base}/new")),
        table,
    })?;
    Ok(visitor
        .page(&state, plural(&label), Some(app), None, body)?
        .into_response())
}

async fn show(
    State(state): State<AppState>,
    visitor: Visitor,
    Path((app, entity, id)): Path<(String, String, String)>,
) -> PageResult {
    let (app, def, collection) = resolve(&state, &app, &entity)?;
    let (record, refs) = futures::try_join!(collection.get(&id), load_references(app, def))?;

    let rows = def
        .fields
        .iter()
        .filter(|f| !matches!(f.type_, FieldType::Password))
        .map(|f| DetailRow {
            label: f.display_label(),
            value: field_column(f, &refs).render_cell(&record),
        })
        .collect();
    let href = record_href(app, def, &id);
    let title = def.record_title(&record);
    let body = state.renderer.detail(&DetailView {
        title: title.clone(),
        rows,
        edit_href: Some(format!("{href}/edit")),
        delete_href: Some(format!("{href}/delete")),
        back_href: Some(entity_href(app, def)),
        confirm_js: escape_js(&format!(
            "Delete {}? This cannot be undone.",
            def.display_label().to_lowercase()
        )),
    })?;
    Ok(visitor
        .page(&state, title, Some(app), None, body)?
        .into_response())
}

/// What a form page submits to.
#[derive(Debug, Clone, Copy)]
enum FormTarget<'a> {
    Create,
    Update(&'a str),
}

struct FormPage<'a> {
    app: &'a AppHandle,
    def: &'a EntityDef,
    target: FormTarget<'a>,
    initial: Option<Record>,
    errors: ValidationErrors,
    flash: Option<Flash>,
    status: StatusCode,
}

impl<'a> FormPage<'a> {
    fn new(app: &'a AppHandle, def: &'a EntityDef, target: FormTarget<'a>) -> Self {
        Self {
            app,
            def,
            target,
            initial: None,
            errors: ValidationErrors::new(),
            flash: None,
            status: StatusCode::OK,
        }
    }

    async fn render(self, state: &AppState, visitor: &Visitor) -> PageResult {
        let refs = load_references(self.app, self.def).await?;
        let label = self.def.display_label();
        let (heading, action, submit, cancel) = match self.target {
            FormTarget::Create => (
                format!("New {label}"),
                entity_href(self.app, self.def),
                "Create",
                entity_href(self.app, self.def),
            ),
            FormTarget::Update(id) => {
                let href = record_href(self.app, self.def, id);
                (format!("Edit {label}"), href.clone(), "Save", href)
            }
        };

        let error_summary = (!self.errors.is_empty()).then(|| {
            format!(
                "Please correct the {} highlighted field(s).",
                self.errors.len()
            )
        });
        let mut form = EntityForm::new(self.def)
            .with_action(action)
            .with_submit_label(submit)
            .with_cancel_href(cancel)
            .with_errors(self.errors);
        if let Some(initial) = self.initial {
            form = form.with_initial(initial);
        }
        for (entity, options) in refs {
            form = form.with_reference_options(entity, options);
        }

        let body = state.renderer.edit(&EditView {
            heading: heading.clone(),
            error_summary,
            form: form.render(&state.renderer)?,
        })?;
        let page = visitor.page(state, heading, Some(self.app), self.flash, body)?;
        Ok((self.status, page).into_response())
    }
}

/// Page for a rejected submission: field errors with 422, handler errors with their status.
async fn rejected_form<E>(
    state: &AppState,
    visitor: &Visitor,
    mut page: FormPage<'_>,
    pairs: &[(String, String)],
    err: SubmitError<E>,
) -> PageResult
where
    E: Into<PageError>,
{
    page.initial = Some(pairs_to_record(pairs));
    match err {
        SubmitError::Invalid(errors) => {
            page.errors = errors;
            page.status = StatusCode::UNPROCESSABLE_ENTITY;
        }
        SubmitError::Handler(err) => {
            let err: PageError = err.into();
            if err.status == StatusCode::NOT_FOUND {
                return Err(err);
            }
            page.flash = Some(Flash::error(format!("Could not save: {}", err.message)));
            page.status = err.status;
        }
    }
    page.render(state, visitor).await
}

async fn new_form(
    State(state): State<AppState>,
    visitor: Visitor,
    Path((app, entity)): Path<(String, String)>,
) -> PageResult {
    let (app, def, _) = resolve(&state, &app, &entity)?;
    FormPage::new(app, def, FormTarget::Create)
        .render(&state, &visitor)
        .await
}

async fn edit_form(
    State(state): State<AppState>,
    visitor: Visitor,
    Path((app, entity, id)): Path<(String, String, String)>,
) -> PageResult {
    let (app, def, collection) = resolve(&state, &app, &entity)?;
    let record = collection.get(&id).await?;
    let mut page = FormPage::new(app, def, FormTarget::Update(&id));
    page.initial = Some(record);
    page.render(&state, &visitor).await
}

async fn create(
    State(state): State<AppState>,
    visitor: Visitor,
    Path((app, entity)): Path<(String, String)>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> PageResult {
    let (app, def, collection) = resolve(&state, &app, &entity)?;
    let submitted = EntityForm::new(def)
        .submit(&pairs, |record| async move { collection.create(&record).await })
        .await;
    match submitted {
        Ok(created) => {
            let id = record_id(&created);
            info!(app = %app.name, entity = %def.name, id, "record created");
            Ok(Redirect::to(&record_href(app, def, id)).into_response())
        }
        Err(err) => {
            let page = FormPage::new(app, def, FormTarget::Create);
            rejected_form(&state, &visitor, page, &pairs, err).await
        }
    }
}

async fn update(
    State(state): State<AppState>,
    visitor: Visitor,
    Path((app, entity, id)): Path<(String, String, String)>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> PageResult {
    let (app, def, collection) = resolve(&state, &app, &entity)?;
    let submitted = EntityForm::new(def)
        .submit(&pairs, |record| {
            let id = id.as_str();
            async move { collection.update(id, &record).await }
        })
        .await;
    match submitted {
        Ok(_) => {
            info!(app = %app.name, entity = %def.name, id = %id, "record updated");
            Ok(Redirect::to(&record_href(app, def, &id)).into_response())
        }
        Err(err) => {
            let page = FormPage::new(app, def, FormTarget::Update(&id));
            rejected_form(&state, &visitor, page, &pairs, err).await
        }
    }
}

async fn delete(
    State(state): State<AppState>,
    Path((app, entity, id)): Path<(String, String, String)>,
) -> PageResult {
    let (app, def, collection) = resolve(&state, &app, &entity)?;
    collection.delete(&id).await?;
    info!(app = %app.name, entity = %def.name, id = %id, "record deleted");
    Ok(Redirect::to(&entity_href(app, def)).into_response())
}

/// Fallback page for unknown paths.
pub async fn not_found(State(state): State<AppState>, visitor: Visitor) -> PageResult {
    let body = format!(
        "<h1>Page not found</h1>\n<p>Nothing lives at <code>{}</code>.</p>",
        escape(&visitor.location)
    );
    let page = visitor.page(&state, "Not found", None, None, body)?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
