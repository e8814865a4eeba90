//! Word duel server.
//!
//! Serves the duel HTTP API over in-memory or PostgreSQL storage and
//! periodically expires invites nobody answered.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use worduel::{
    DuelManager,
    db::{Database, PgDuelRepository},
    words::EmbeddedWordList,
};
use worduel_server::{
    api,
    config::{ServerConfig, StorageBackend},
    logging, metrics,
};

const HELP: &str = "\
Run a word duel server

USAGE:
  worduel_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --storage    BACKEND     memory or postgres          [default: env STORAGE_BACKEND or memory]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:8080)
  STORAGE_BACKEND              memory or postgres
  DATABASE_URL                 PostgreSQL connection string
  FIRST_SETTER                 inviter or invitee sets the first word
  SETTER_CONSOLATION_POINTS    Setter points when a round is not solved
  INVITE_TTL_SECS              Pending invites older than this expire
  INVITE_SWEEP_INTERVAL_SECS   How often expiry runs
  METRICS_BIND                 Prometheus listener (disabled when unset)
  RUST_LOG                     Log filter
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let db_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let storage: Option<StorageBackend> = pargs.opt_value_from_str("--storage")?;

    let config = ServerConfig::from_env(bind, db_url, storage)?;
    config.validate()?;

    logging::init();
    info!("Starting word duel server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    let (manager, database) = match config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage; sessions are lost on restart");
            (DuelManager::in_memory(config.rules.clone())?, None)
        }
        StorageBackend::Postgres => {
            let db = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.migrate()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
            info!("Database connected and migrated");

            let manager = DuelManager::new(
                Arc::new(PgDuelRepository::new(db.pool().clone())),
                Arc::new(EmbeddedWordList::new()),
                config.rules.clone(),
            )?;
            (manager, Some(db))
        }
    };

    let manager = Arc::new(manager);
    spawn_invite_sweep(manager.clone(), config.invite_ttl, config.sweep_interval)?;

    let app = api::create_router(api::AppState { manager, database });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Expire stale pending invites every `interval`.
fn spawn_invite_sweep(
    manager: Arc<DuelManager>,
    ttl: Duration,
    interval: Duration,
) -> Result<(), Error> {
    let ttl = chrono::Duration::from_std(ttl)?;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match manager.expire_stale_invites(ttl).await {
                Ok(0) => {}
                Ok(expired) => {
                    metrics::invites_expired_total(expired);
                    info!("Expired {} stale invite(s)", expired);
                }
                Err(e) => log::warn!("Invite sweep failed: {}", e),
            }
        }
    });

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
