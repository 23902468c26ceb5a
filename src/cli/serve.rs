//! `vcsstore serve`: run the HTTP API.

use clap::Parser;
use tokio::net::TcpListener;

use crate::cli::{subcommand_argv, CliError};
use crate::config::schema::resolve_addr;
use crate::config::{validate_config, ConfigError, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::{logging, metrics};
use crate::storage::PathLayout;

/// Starts an HTTP server that serves information about VCS repositories.
#[derive(Debug, Parser)]
#[command(name = "serve", bin_name = "vcsstore serve")]
pub struct ServeArgs {
    /// Debug mode (don't use on publicly available servers)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// HTTP listen address [default: :9090]
    #[arg(long = "http", value_name = "ADDR")]
    pub http: Option<String>,

    /// Use hashed directory names for repository storage
    #[arg(long)]
    pub hashed_path: bool,
}

impl ServeArgs {
    /// Applies the flags on top of the loaded configuration.
    pub fn apply(&self, config: &mut ServiceConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(addr) = &self.http {
            config.listener.bind_address = addr.clone();
        }
        if self.hashed_path {
            config.storage.layout = PathLayout::Hashed;
        }
    }
}

pub fn run(mut config: ServiceConfig, args: &[String]) -> Result<(), CliError> {
    let serve_args = ServeArgs::try_parse_from(subcommand_argv("serve", args))?;
    serve_args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    config.storage.storage().ensure_root()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServiceConfig) -> Result<(), CliError> {
    if let Some(addr) = &config.observability.metrics_address {
        metrics::init_metrics(resolve_addr(addr)?).map_err(|e| CliError::Metrics(e.to_string()))?;
    }

    let listener = TcpListener::bind(config.listener.socket_addr()?).await?;
    eprintln!("Starting server on {}", config.listener.bind_address);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
