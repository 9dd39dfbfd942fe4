//! snipspace - password-gated clipping dashboard
//!
//! Single-binary web service: serves the dashboard UI, the entry
//! persistence boundary (SQLite + local image storage) and the access
//! boundary (password unlock, session cookies).

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use snipspace::{build_router, AppState};
use snipspace_common::auth::ensure_access_hash;
use snipspace_common::config;
use snipspace_common::db::init_database;

/// Command-line arguments for snipspace
#[derive(Parser, Debug)]
#[command(name = "snipspace")]
#[command(about = "Personal clipping dashboard")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5760", env = "SNIPSPACE_PORT")]
    port: u16,

    /// Root folder holding the database and stored images
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting snipspace v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    config::ensure_directories(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let db_path = config::database_path(&root_folder);
    let pool = init_database(&db_path).await?;
    info!("✓ Database ready: {}", db_path.display());

    // Seed the access hash from the environment on first run. With no
    // password configured anywhere, the dashboard runs unlocked.
    let env_password = std::env::var("SNIPSPACE_PASSWORD").ok();
    let access_hash = ensure_access_hash(&pool, env_password.as_deref()).await?;
    if access_hash.is_some() {
        info!("✓ Access password configured");
    } else {
        info!("No access password configured - dashboard runs unlocked");
        info!("Set SNIPSPACE_PASSWORD to enable the lock screen");
    }

    let images_dir = config::images_dir(&root_folder);
    let state = AppState::new(pool, access_hash, images_dir);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("snipspace listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
