//! Workbench configuration management using Figment
//!
//! Settings come from built-in defaults, an optional `workbench.{toml,yaml,json}`
//! file and `WORKBENCH_`-prefixed environment variables, in that order of
//! precedence.
//!
//! ```no_run
//! use workbench_config::ConfigProvider;
//!
//! let config = ConfigProvider::new().load()?;
//! println!("listening on {}", config.listen_addr());
//! # Ok::<(), workbench_config::ConfigError>(())
//! ```
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [backend]
//! kind = "http"
//! endpoint = "https://cloud.appwrite.io/v1"
//! project_id = "clinic"
//!
//! [collections]
//! doctors = "staff"
//! ```

pub mod error;
pub mod provider;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigFormat, ConfigProvider, CONFIG_FILE_STEM, ENV_PREFIX};
pub use types::{
    BackendConfig, BackendKind, CollectionIds, SchemaConfig, ServerConfig, SessionConfig,
    StatsConfig, ThemeConfig, WorkbenchConfig,
};

/// Load configuration from the working directory and environment.
pub fn load_configuration() -> ConfigResult<WorkbenchConfig> {
    ConfigProvider::new().load()
}
