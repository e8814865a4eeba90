//! HTTP API for the duel server.
//!
//! Thin JSON layer over [`DuelManager`]: every handler resolves the caller,
//! runs one manager command and projects the result for that caller.
//!
//! # Modules
//!
//! - [`invites`]: Send, list and answer invites
//! - [`games`]: Set words, guess, forfeit, inspect sessions
//! - [`users`]: Per-player statistics and the leaderboard
//! - [`middleware`]: Caller identity from the `X-Player-Id` header
//! - [`request_id`]: Request IDs and per-route HTTP metrics
//! - [`errors`]: Error-to-status mapping
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use worduel::{DuelManager, DuelRules};
//! use worduel_server::api::{AppState, create_router};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState {
//!     manager: Arc::new(DuelManager::in_memory(DuelRules::default())?),
//!     database: None,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. Put the server behind a proxy that
//! restricts origins in production.

pub mod errors;
pub mod games;
pub mod invites;
pub mod middleware;
pub mod request_id;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use worduel::{DuelManager, db::Database};

/// Application state shared across all HTTP handlers.
///
/// # Fields
///
/// - `manager`: Invites, sessions and stats
/// - `database`: Pool used for health checks; `None` with in-memory storage
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<DuelManager>,
    pub database: Option<Database>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                             - Health check (public)
/// GET  /api/v1/users/leaderboard?limit=N   - Top players (public)
/// GET  /api/v1/users/{player_id}/stats     - Player statistics (public)
/// POST /api/v1/invites                     - Send invite
/// GET  /api/v1/invites/me                  - Sent and received invites
/// POST /api/v1/invites/{id}/respond        - Accept or decline
/// GET  /api/v1/games                       - Caller's sessions
/// GET  /api/v1/games/word-options?count=N  - Candidate words
/// GET  /api/v1/games/{id}                  - One session
/// POST /api/v1/games/{id}/set-word         - Set the round word
/// POST /api/v1/games/{id}/guess            - Submit a guess
/// POST /api/v1/games/{id}/forfeit          - Abandon the session
/// ```
///
/// All non-public routes require `X-Player-Id`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    let public_routes = Router::new()
        .route("/users/leaderboard", get(users::leaderboard))
        .route("/users/{player_id}/stats", get(users::player_stats));

    let protected_routes = Router::new()
        .route("/invites", post(invites::create_invite))
        .route("/invites/me", get(invites::list_my_invites))
        .route("/invites/{invite_id}/respond", post(invites::respond_to_invite))
        .route("/games", get(games::list_games))
        .route("/games/word-options", get(games::word_options))
        .route("/games/{game_id}", get(games::get_game))
        .route("/games/{game_id}/set-word", post(games::set_word))
        .route("/games/{game_id}/guess", post(games::submit_guess))
        .route("/games/{game_id}/forfeit", post(games::forfeit))
        .layer(axum::middleware::from_fn(middleware::identity_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable`
/// otherwise. In-memory storage is always reachable.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","storage":"memory","database":null,...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.database {
        Some(db) => ("postgres", Some(db.health_check().await.is_ok())),
        None => ("memory", None),
    };
    let healthy = db_healthy.unwrap_or(true);

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
