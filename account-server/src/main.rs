use account_identity::{AccountService, AccountStore, MemoryAccountStore, PgAccountStore};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use account_server::{
    config::{signing_secret_from_env, ServerSettings, StoreBackend},
    create_app, AppState,
};

/// Honeycomb account service HTTP server
#[derive(Parser, Debug)]
#[command(name = "account-server")]
#[command(about = "Account registration and login API")]
struct Args {
    /// Server bind address
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; variables may come from the real environment
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut settings =
        ServerSettings::load(args.config.as_deref()).context("Failed to load server settings")?;
    apply_cli_overrides(&mut settings, &args);

    logger_redacted::init_tracing(&settings.log).context("Failed to initialise logging")?;

    info!("Starting Honeycomb account server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let secret = signing_secret_from_env().context("Token signing secret is not configured")?;
    let store = build_store(&settings).await?;

    let accounts = AccountService::from_config(store, &secret, settings.identity.clone())
        .context("Failed to initialise account service")?;
    let app = create_app(AppState::new(Arc::new(accounts)), &settings)
        .context("Failed to build router")?;

    let addr = settings.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Account server running on http://{}", addr);
    info!("Health check available at: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(setup_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Account server stopped");
    Ok(())
}

fn apply_cli_overrides(settings: &mut ServerSettings, args: &Args) {
    if let Some(host) = &args.host {
        settings.host.clone_from(host);
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if args.verbose {
        settings.log.log_level = "debug".to_string();
    }
    let production = std::env::var("HONEYCOMB_ENV").is_ok_and(|env| env == "production");
    if args.json_logs || production {
        settings.log.json = true;
    }
}

async fn build_store(settings: &ServerSettings) -> anyhow::Result<Arc<dyn AccountStore>> {
    match settings.store {
        StoreBackend::Memory => {
            warn!("Using in-memory account store; accounts are lost on restart");
            Ok(Arc::new(MemoryAccountStore::new()))
        }
        StoreBackend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let store = PgAccountStore::connect(url, settings.identity.store_timeout())
                .await
                .context("Failed to connect to the account database")?;
            store
                .ensure_schema()
                .await
                .context("Failed to prepare the account schema")?;
            info!("Using PostgreSQL account store");
            Ok(Arc::new(store))
        }
    }
}

async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received TERM signal, initiating graceful shutdown...");
        },
    }
}
