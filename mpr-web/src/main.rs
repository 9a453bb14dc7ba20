//! mpr-web - Missing persons registry portal
//!
//! Serves the public listing, case detail and tip form over the registry
//! REST API, plus a small JSON API and health endpoints.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mpr_common::config::{self, LoadedConfig, Overrides, Settings};
use mpr_common::ApiService;
use mpr_web::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for mpr-web
#[derive(Parser, Debug)]
#[command(name = "mpr-web")]
#[command(about = "Missing persons registry portal")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Registry API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Registry request timeout in milliseconds
    #[arg(long)]
    api_timeout_ms: Option<u64>,

    /// Answer from the built-in dataset when the registry fails
    #[arg(long)]
    mock: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Config file path
    #[arg(short, long, env = "MPR_CONFIG")]
    config: Option<PathBuf>,

    /// Write the resolved settings to the config file and exit
    #[arg(long)]
    write_default_config: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_base_url: self.api_url.clone(),
            api_timeout_ms: self.api_timeout_ms,
            use_api_mock: self.mock.then_some(true),
            bind_addr: self.bind.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = if args.write_default_config {
        LoadedConfig::default()
    } else {
        config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?
    };
    let settings = Settings::resolve(args.overrides().or(Overrides::from_env()), loaded.config)
        .context("Invalid configuration")?;

    init_tracing(&settings.log_level);

    // Log build identification immediately after tracing init
    info!(
        "Starting mpr-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if args.write_default_config {
        let path = args
            .config
            .clone()
            .or_else(config::default_config_path)
            .context("No config path available")?;
        config::write_toml_config(&settings.to_toml(), &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote config to {}", path.display());
        return Ok(());
    }

    match &loaded.source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }
    info!("Registry API: {}", settings.api_base_url);
    if settings.use_api_mock {
        warn!("Mock fallback enabled: registry failures will be answered from built-in data");
    }

    let api = ApiService::new(settings.client_config()).context("Failed to create API client")?;
    let app = build_router(AppState::new(api));

    let addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("mpr-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(level: &str) {
    let default_filter = format!(
        "mpr_web={level},mpr_common={level},tower_http={level}",
        level = level
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
