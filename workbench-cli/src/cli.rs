//! CLI definition for the workbench server.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Workbench - esports tournament manager and clinic appointment booker.
///
/// Both apps are served by one web server backed by either an in-memory
/// store or a hosted document backend.
#[derive(Parser, Debug)]
#[command(name = "workbench")]
#[command(version)]
#[command(about = "Esports tournament manager and clinic appointment booker")]
#[command(
    long_about = "Serves the esports and clinic apps from one web server.\n\n\
    Configuration is read from workbench.{toml,yaml,json} in the working directory \
    (or --config) and WORKBENCH_* environment variables, e.g. WORKBENCH_SERVER__PORT=8080."
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file to load instead of searching the working directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Port to listen on, overriding the configuration
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print an app's entity schema as YAML
    Schema {
        app: AppName,
        /// Print only this entity
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Print the resolved configuration with secrets masked
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppName {
    Esports,
    Clinic,
}
