//! Configuration provider using Figment

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};
use crate::types::WorkbenchConfig;

/// Base name of discovered configuration files.
pub const CONFIG_FILE_STEM: &str = "workbench";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "WORKBENCH_";

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| ConfigError::UnsupportedFormat {
            format: ext.to_string(),
        })
    }
}

/// Loads [`WorkbenchConfig`] from layered sources.
///
/// Sources are merged in precedence order (later sources override earlier ones):
/// 1. Default values
/// 2. The configuration file: an explicit path, or the first
///    `workbench.{toml,yaml,yml,json}` found in the search directory
/// 3. Environment variables prefixed `WORKBENCH_`, nested on `__`
///    (`WORKBENCH_COLLECTIONS__DOCTORS=staff`)
///
/// Nothing is cached; every `load` reads the sources again.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    search_dir: PathBuf,
    explicit_file: Option<PathBuf>,
}

impl ConfigProvider {
    /// Search the current working directory.
    pub fn new() -> Self {
        Self {
            search_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            explicit_file: None,
        }
    }

    /// Search `dir` instead of the working directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dir: dir.into(),
            explicit_file: None,
        }
    }

    /// Use exactly this file. It must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> ConfigResult<WorkbenchConfig> {
        let figment = self.build_figment()?;
        let config: WorkbenchConfig = figment.extract()?;
        config.validate()?;
        debug!(
            backend = ?config.backend.kind,
            addr = %config.listen_addr(),
            "loaded configuration"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(WorkbenchConfig::default()));
        if let Some(path) = self.config_file()? {
            figment = figment.merge(Self::file_provider(&path)?);
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// The file to load, if any.
    fn config_file(&self) -> ConfigResult<Option<PathBuf>> {
        if let Some(path) = &self.explicit_file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path: path.clone() });
            }
            return Ok(Some(path.clone()));
        }
        for ext in ["toml", "yaml", "yml", "json"] {
            let candidate = self.search_dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            trace!(path = %candidate.display(), "checking for config file");
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    fn file_provider(path: &Path) -> ConfigResult<Figment> {
        debug!(path = %path.display(), "loading config file");
        Ok(match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        })
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigProvider::in_dir(temp_dir.path())
            .with_file(temp_dir.path().join("nope.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_unsupported_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("workbench.ini");
        fs::write(&path, "port=1").unwrap();
        let err = ConfigProvider::in_dir(temp_dir.path())
            .with_file(&path)
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_discovery_prefers_toml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("workbench.toml"), "").unwrap();
        fs::write(temp_dir.path().join("workbench.json"), "{}").unwrap();
        let found = ConfigProvider::in_dir(temp_dir.path())
            .config_file()
            .unwrap()
            .unwrap();
        assert!(found.ends_with("workbench.toml"));
    }
}
