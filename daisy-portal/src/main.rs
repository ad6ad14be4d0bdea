//! daisy-portal - student portfolio portal
//!
//! `serve` (default) starts the HTTP API; `import-bios` seeds the biography
//! store from the roster's "Small Biography" column.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use daisy_common::config::{ConfigOverrides, PortalConfig};
use daisy_common::db::{init_database, BiographyStore};
use daisy_common::RosterStore;
use daisy_portal::services::CloudinaryClient;
use daisy_portal::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for daisy-portal
#[derive(Parser, Debug)]
#[command(name = "daisy-portal")]
#[command(about = "Student portfolio portal")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "DAISY_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding students.csv and portal.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Roster CSV (defaults to <root>/students.csv)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// SQLite database (defaults to <root>/portal.db)
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address, e.g. 0.0.0.0:5000
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Copy roster biographies into the database
    ImportBios,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daisy_portal=info,daisy_common=info,tower_http=info".into()),
        )
        .init();

    info!(
        "Starting daisy-portal v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let bind = match &args.command {
        Some(Command::Serve { bind }) => bind.clone(),
        _ => None,
    };

    let config = PortalConfig::resolve(&ConfigOverrides {
        config_file: args.config.clone(),
        root_folder: args.root_folder.clone(),
        roster_path: args.roster.clone(),
        database_path: args.database.clone(),
        bind_address: bind,
    })
    .context("Failed to resolve configuration")?;

    config
        .ensure_root_folder()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", config.root_folder.display());
    info!("Roster: {}", config.roster_path.display());
    info!("Database: {}", config.database_path.display());

    let roster = RosterStore::load(&config.roster_path).context("Failed to load roster")?;
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    match args.command {
        Some(Command::ImportBios) => {
            let copied = BiographyStore::new(pool).import_from_roster(&roster).await?;
            info!("Migration complete. {} biographies copied.", copied);
            Ok(())
        }
        Some(Command::Serve { .. }) | None => serve(config, roster, pool).await,
    }
}

async fn serve(config: PortalConfig, roster: RosterStore, pool: sqlx::SqlitePool) -> Result<()> {
    if !config.media_host.is_configured() {
        warn!("Media host credentials missing; uploads and deletions will fail");
    }
    let media = CloudinaryClient::new(config.media_host.clone())
        .context("Failed to build media host client")?;

    let state = AppState::new(pool, Arc::new(roster), Arc::new(media));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("daisy-portal listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
