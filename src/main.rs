//! Anandwan outreach site server.
//!
//! # Running
//!
//! ```bash
//! export ANANDWAN_DATABASE_URL=sqlite://anandwan.db?mode=rwc
//! cargo run --bin anandwan-site
//! ```
//!
//! Then, for example:
//!
//! ```bash
//! curl -c cookies.txt -H 'content-type: application/json' \
//!      -d '{"username":"anandwan","password":"admin123"}' \
//!      http://127.0.0.1:3000/api/staff/login
//! ```

use std::time::Duration;

use anandwan_outreach::migration::{Migrator, MigratorTrait};
use anandwan_outreach::server::{self, AppState};
use anandwan_outreach::{Config, LocalStore, SubmissionStore, VisitorSessionStore};
use dotenvy::dotenv;
use sea_orm::{ConnectOptions, Database};
use tower_sessions::ExpiredDeletion;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SESSION_CLEANUP_PERIOD: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    dotenv().ok();
    let config = Config::from_env();

    info!(database_url = %config.database_url, "connecting to database");

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;
    info!("database ready");

    // One store per database: its clones share the write lock
    let local = LocalStore::new(db);
    let state = AppState::new(SubmissionStore::new(local.clone()), &config);

    let session_store = VisitorSessionStore::new(local);
    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_PERIOD);
        loop {
            interval.tick().await;
            if let Err(e) = cleanup_store.delete_expired().await {
                warn!(error = %e, "expired session cleanup failed");
            }
        }
    });

    let app = server::app(state, session_store, &config);

    info!("server starting on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
