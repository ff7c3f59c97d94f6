//! Workbench CLI.
//!
//! Commands:
//! - `workbench serve [--port N] [--bind ADDR]`: Run the web server
//! - `workbench schema <esports|clinic> [--entity NAME]`: Print entity schemas as YAML
//! - `workbench config`: Print the resolved configuration
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use workbench::commands::{config_yaml, load_config, log_filter, run_serve, schema_yaml};
use workbench::{Cli, Commands};

fn report(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.debug))
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let exit_code = match cli.command {
        Commands::Serve { port, bind } => {
            let result = match load_config(config_path) {
                Ok(config) => run_serve(config, port, bind).await,
                Err(e) => Err(e),
            };
            report(result)
        }
        Commands::Schema { app, entity } => report(
            schema_yaml(app, entity.as_deref()).map(|yaml| print!("{yaml}")),
        ),
        Commands::Config => report(
            load_config(config_path)
                .and_then(|config| config_yaml(&config))
                .map(|yaml| print!("{yaml}")),
        ),
    };

    std::process::exit(exit_code);
}
