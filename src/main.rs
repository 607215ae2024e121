//! Lanai REST Gateway - Main entrypoint.
//!
//! This is the main entry point for the Lanai REST gateway application.
//! It initializes the logging system, loads configuration, builds the component
//! registry and starts the server.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};
use lanai_rest_lib::config::{ConfigLoader, LanaiConfig, LogConfig, ENV_PREFIX};
use lanai_rest_lib::error::{LanaiError, LanaiResult};
use lanai_rest_lib::transport::RestServer;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Command line arguments for the Lanai REST gateway.
#[derive(Parser, Debug)]
#[clap(name = "Lanai REST Gateway", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the server
    Start,

    /// Validate the configuration file and the component registry
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(log: &LogConfig) -> LanaiResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let result = if log.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(log.source_location)
                    .with_line_number(log.source_location)
                    .with_thread_names(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(log.source_location)
                    .with_line_number(log.source_location)
                    .with_thread_names(true),
            )
            .try_init()
    };

    result.map_err(|e| LanaiError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

/// Loads the configuration, logging with defaults and exiting when it is invalid.
fn load_config(loader: &ConfigLoader) -> LanaiResult<LanaiConfig> {
    match loader.load() {
        Ok(config) => {
            init_logging(&config.log)?;
            Ok(config)
        }
        Err(e) => {
            init_logging(&LogConfig::default())?;
            error!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

/// Boots the registry, then runs the server on a multi-threaded runtime.
fn start(config: LanaiConfig) -> LanaiResult<()> {
    info!(version = lanai_rest_lib::VERSION, "Starting Lanai REST gateway");

    let started = Instant::now();
    let dispatcher = lanai_rest_lib::boot(&config)?;
    info!(
        methods = dispatcher.index().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Boot completed"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .thread_name("lanai-worker")
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        RestServer::new(config.server, dispatcher).run().await?;
        info!("Server stopped");
        Ok::<(), LanaiError>(())
    })
}

/// Main entry point for the application.
fn main() -> LanaiResult<()> {
    let args = Args::parse();
    let loader = ConfigLoader::new(args.config.as_deref(), ENV_PREFIX);

    match args.command.unwrap_or(Command::Start) {
        Command::Start => {
            let config = load_config(&loader)?;
            if let Err(e) = start(config) {
                error!("Fatal error: {}", e);
                process::exit(1);
            }
            Ok(())
        }
        Command::Validate => {
            let config = load_config(&loader)?;
            info!("Configuration validated successfully");
            match lanai_rest_lib::boot(&config) {
                Ok(dispatcher) => {
                    info!(methods = dispatcher.index().len(), "Component registry validated successfully");
                    Ok(())
                }
                Err(e) => {
                    error!("Registry validation error: {}", e);
                    process::exit(1);
                }
            }
        }
        Command::GenConfig { output } => {
            init_logging(&LogConfig::default())?;
            info!("Generating default configuration");
            let default_config = LanaiConfig::default();

            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent).map_err(LanaiError::Io)?;
            }

            let toml = toml::to_string_pretty(&default_config)
                .map_err(|e| LanaiError::Custom(format!("Failed to serialize config: {e}")))?;

            std::fs::write(&output, toml).map_err(LanaiError::Io)?;

            info!("Default configuration written to {:?}", output);
            Ok(())
        }
    }
}
