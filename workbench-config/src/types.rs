//! Configuration schema for the workbench server

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Which `Backend` implementation the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process store. Data is lost on restart.
    #[default]
    Memory,
    /// Hosted REST backend.
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// REST endpoint including the version path, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub database_id: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Memory,
            endpoint: String::new(),
            project_id: String::new(),
            api_key: None,
            database_id: "workbench".into(),
        }
    }
}

/// Collection id per entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionIds {
    pub tournaments: String,
    pub teams: String,
    pub players: String,
    pub matches: String,
    pub doctors: String,
    pub patients: String,
    pub appointments: String,
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            tournaments: "tournaments".into(),
            teams: "teams".into(),
            players: "players".into(),
            matches: "matches".into(),
            doctors: "doctors".into(),
            patients: "patients".into(),
            appointments: "appointments".into(),
        }
    }
}

impl CollectionIds {
    /// Collection id for a collection key such as `doctors`.
    pub fn id_for(&self, key: &str) -> Option<&str> {
        let id = match key {
            "tournaments" => &self.tournaments,
            "teams" => &self.teams,
            "players" => &self.players,
            "matches" => &self.matches,
            "doctors" => &self.doctors,
            "patients" => &self.patients,
            "appointments" => &self.appointments,
            _ => return None,
        };
        Some(id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session secret.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "workbench_session".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Theme used when the visitor has not picked one.
    pub default: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default: "light".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// How long dashboard statistics are served from cache.
    pub ttl_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchemaConfig {
    /// Directory with `<app>/<entity>.yaml` files replacing built-in entity definitions.
    pub overrides_dir: Option<PathBuf>,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub collections: CollectionIds,
    pub session: SessionConfig,
    pub theme: ThemeConfig,
    pub stats: StatsConfig,
    pub schemas: SchemaConfig,
}

impl WorkbenchConfig {
    /// `bind:port`, ready for a listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    pub fn stats_ttl(&self) -> Duration {
        Duration::from_secs(self.stats.ttl_secs)
    }

    /// Check cross-field constraints figment cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend.kind == BackendKind::Http {
            if self.backend.endpoint.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "backend.endpoint",
                    "required when backend.kind is 'http'",
                ));
            }
            if self.backend.project_id.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "backend.project_id",
                    "required when backend.kind is 'http'",
                ));
            }
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "session.cookie_name",
                "must not be empty",
            ));
        }
        if self.stats.ttl_secs == 0 {
            return Err(ConfigError::invalid_value(
                "stats.ttl_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.backend.api_key.is_some() {
            config.backend.api_key = Some("********".into());
        }
        config
    }
}
