//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use workbench_apps::{clinic, esports};
use workbench_config::{ConfigProvider, WorkbenchConfig};
use workbench_fields::Schema;

use crate::cli::AppName;

/// Log filter for the binary. `--debug` turns on every workbench crate and
/// request tracing; otherwise `RUST_LOG` applies, defaulting to `info`.
pub fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("workbench=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Resolve configuration from `path`, or the working directory and environment.
pub fn load_config(path: Option<&Path>) -> Result<WorkbenchConfig> {
    let provider = match path {
        Some(path) => ConfigProvider::new().with_file(path),
        None => ConfigProvider::new(),
    };
    let config = provider.load().context("failed to load configuration")?;
    debug!(backend = ?config.backend.kind, addr = %config.listen_addr(), "configuration loaded");
    Ok(config)
}

pub async fn run_serve(
    mut config: WorkbenchConfig,
    port: Option<u16>,
    bind: Option<String>,
) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    workbench_web::serve(config).await?;
    Ok(())
}

fn app_schema(app: AppName) -> Result<Schema> {
    let schema = match app {
        AppName::Esports => esports::schema()?,
        AppName::Clinic => clinic::schema()?,
    };
    Ok(schema)
}

/// YAML for an app's schema, or for one of its entities.
pub fn schema_yaml(app: AppName, entity: Option<&str>) -> Result<String> {
    let schema = app_schema(app)?;
    match entity {
        Some(name) => {
            let def = schema.require(name)?;
            Ok(serde_yaml_ng::to_string(def)?)
        }
        None => Ok(schema.to_yaml()?),
    }
}

pub fn config_yaml(config: &WorkbenchConfig) -> Result<String> {
    Ok(serde_yaml_ng::to_string(&config.redacted())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_filter_uses_crate_prefix() {
        let filter = log_filter(true).to_string();
        assert!(filter.contains("workbench=debug"));
        assert!(filter.contains("tower_http=debug"));
        assert!(!filter.contains("workbench_"));
    }

    #[test]
    fn schema_yaml_for_one_entity() {
        let yaml = schema_yaml(AppName::Clinic, Some("doctor")).unwrap();
        assert!(yaml.contains("name: doctor"));
        assert!(yaml.contains("specialty"));
        assert!(!yaml.contains("patient_id"));
    }

    #[test]
    fn schema_yaml_for_app() {
        let yaml = schema_yaml(AppName::Esports, None).unwrap();
        assert!(yaml.contains("tournament"));
        assert!(yaml.contains("gamer_tag"));
    }

    #[test]
    fn unknown_entity_fails() {
        assert!(schema_yaml(AppName::Esports, Some("referee")).is_err());
    }

    #[test]
    fn config_yaml_masks_api_key() {
        let mut config = WorkbenchConfig::default();
        config.backend.api_key = Some("top-secret".into());
        let yaml = config_yaml(&config).unwrap();
        assert!(!yaml.contains("top-secret"));
        assert!(yaml.contains("port: 3000"));
    }
}
