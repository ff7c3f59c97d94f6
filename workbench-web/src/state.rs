//! Shared state handed to every handler.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};
use workbench_apps::clinic::{self, ClinicStats};
use workbench_apps::esports::{self, EsportsStats};
use workbench_apps::{ClinicApi, Collection, EsportsApi};
use workbench_backend::Backend;
use workbench_config::WorkbenchConfig;
use workbench_entity::Renderer;
use workbench_fields::{EntityDef, Record, Schema};

use crate::cache::StatsCache;
use crate::error::Result;
use crate::theme::ThemeProvider;

/// One app's schema plus an untyped collection per entity.
pub struct AppHandle {
    pub name: String,
    pub label: String,
    pub schema: Schema,
    collections: HashMap<String, Collection<Record>>,
}

impl AppHandle {
    fn new(
        label: &str,
        schema: Schema,
        backend: &Arc<dyn Backend>,
        config: &WorkbenchConfig,
    ) -> Self {
        let collections = schema
            .entities()
            .iter()
            .map(|def| {
                let id = config
                    .collections
                    .id_for(&def.collection)
                    .unwrap_or(def.collection.as_str());
                (def.name.clone(), Collection::new(Arc::clone(backend), id))
            })
            .collect();
        Self {
            name: schema.app().to_string(),
            label: label.to_string(),
            schema,
            collections,
        }
    }

    /// Definition and collection of one entity.
    pub fn entity(&self, name: &str) -> Option<(&EntityDef, &Collection<Record>)> {
        let def = self.schema.get(name)?;
        let collection = self.collections.get(name)?;
        Some((def, collection))
    }

    pub fn href(&self) -> String {
        format!("/{}", self.name)
    }
}

/// Everything handlers share.
pub struct StateInner {
    pub backend: Arc<dyn Backend>,
    pub renderer: Renderer,
    pub themes: ThemeProvider,
    pub apps: Vec<AppHandle>,
    pub clinic: ClinicApi,
    pub esports: EsportsApi,
    pub clinic_stats: StatsCache<ClinicStats>,
    pub esports_stats: StatsCache<EsportsStats>,
    pub session_cookie: String,
    /// Date handlers treat as today.
    pub today: fn() -> NaiveDate,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

impl Deref for AppState {
    type Target = StateInner;

    fn deref(&self) -> &StateInner {
        &self.inner
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl AppState {
    pub async fn new(backend: Arc<dyn Backend>, config: &WorkbenchConfig) -> Result<Self> {
        Self::with_clock(backend, config, local_today).await
    }

    /// Like [`new`](Self::new) with a fixed notion of today.
    pub async fn with_clock(
        backend: Arc<dyn Backend>,
        config: &WorkbenchConfig,
        today: fn() -> NaiveDate,
    ) -> Result<Self> {
        let mut esports_schema = esports::schema()?;
        let mut clinic_schema = clinic::schema()?;
        if let Some(dir) = &config.schemas.overrides_dir {
            for schema in [&mut esports_schema, &mut clinic_schema] {
                let app_dir = dir.join(schema.app());
                if app_dir.is_dir() {
                    let applied = schema.apply_overrides(&app_dir).await?;
                    info!(app = schema.app(), applied, "applied schema overrides");
                } else {
                    debug!(path = %app_dir.display(), "no schema overrides");
                }
            }
        }

        let apps = vec![
            AppHandle::new("Esports", esports_schema, &backend, config),
            AppHandle::new("Clinic", clinic_schema, &backend, config),
        ];

        let inner = StateInner {
            renderer: Renderer::new()?,
            themes: ThemeProvider::new(&config.theme.default)?,
            apps,
            clinic: ClinicApi::new(Arc::clone(&backend), &config.collections),
            esports: EsportsApi::new(Arc::clone(&backend), &config.collections),
            clinic_stats: StatsCache::new(config.stats_ttl()),
            esports_stats: StatsCache::new(config.stats_ttl()),
            session_cookie: config.session.cookie_name.clone(),
            today,
            backend,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn app(&self, name: &str) -> Option<&AppHandle> {
        self.apps.iter().find(|a| a.name == name)
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }
}
