//! PlatePerfect API service entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plateperfect_api::api::{create_router, AppState};
use plateperfect_api::backend::BackendClient;
use plateperfect_api::config::Config;
use plateperfect_api::metrics;
use plateperfect_api::utils::shutdown_signal;

/// PlatePerfect API service.
#[derive(Parser, Debug)]
#[command(name = "plateperfect-api")]
#[command(about = "Health/CORS endpoint and backend probe for the PlatePerfect dashboard")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Run {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Probe the hosted backend and print the health report.
    CheckBackend,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("plateperfect_api=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::CheckBackend) => cmd_check_backend().await,
        Some(Command::Run { port }) => cmd_run(port).await,
        None => cmd_run(args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PLATEPERFECT API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Allowed Origins: {}", config.allowed_origins);
    println!("  Environment: {}", config.node_env);
    println!("  Port: {}", config.port);
    println!("  Backend URL: {}", config.backend_url);
    println!("  App ID: {}", config.app_id);
    println!("  Probe Retries: {}", config.probe_retries);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Probe the hosted backend and print the health report.
async fn cmd_check_backend() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PLATEPERFECT API - BACKEND CHECK");
    println!("======================================================================");

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("Backend URL: {}", config.backend_url);
    println!("App ID: {}", config.app_id);
    println!("Retry attempts: {}", config.probe_retries);
    println!("======================================================================");

    print!("\nProbing backend... ");
    let client = BackendClient::new(&config);

    match client.probe().await {
        Ok(report) => {
            println!("OK");
            println!("  Status: {}", report.status);
            if let Some(env) = &report.environment {
                println!("  Environment: {}", env);
            }
            if let Some(version) = &report.version {
                println!("  Version: {}", version);
            }
            if let Some(ts) = &report.timestamp {
                println!("  Timestamp: {}", ts);
            }
            println!("\n======================================================================");
            println!("BACKEND CHECK PASSED");
            println!("======================================================================");
            Ok(())
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            println!("\nThis usually means the backend is not running, the URL is");
            println!("wrong, or the network is unreachable.");
            println!("======================================================================");
            Err(anyhow::anyhow!("Backend check failed"))
        }
    }
}

/// Run the HTTP server.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("Allowed origins: {}", config.allowed_origins);
    info!("Environment: {}", config.node_env);

    // Install the Prometheus recorder before any counters move
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let port = config.port;
    let app_state = AppState::new(config);
    let router = create_router(app_state, Some(metrics_handle));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
