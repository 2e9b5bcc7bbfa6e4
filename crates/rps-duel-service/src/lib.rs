//! RPS Duel Arena Service
//!
//! HTTP front for the duel engine: player accounts on a mock ledger,
//! game routes mapping one-to-one onto the engine's operations, and a
//! simulated clock for driving timeout claims without waiting out real
//! deadlines.

pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use handlers::*;
use state::AppState;

/// Build the full router over the given state.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Players
        .route("/api/player/register", post(register_player))
        .route("/api/players", get(list_players))
        // Games
        .route("/api/games/open", get(list_open_games))
        .route("/api/game/create", post(create_game))
        .route("/api/game/:game_id", get(get_game))
        .route("/api/game/:game_id/join", post(join_game))
        .route("/api/game/:game_id/commit", post(commit_move))
        .route("/api/game/:game_id/reveal", post(reveal_move))
        .route("/api/game/:game_id/cancel", post(cancel_game))
        .route(
            "/api/game/:game_id/claim-commit-timeout",
            post(claim_commit_timeout),
        )
        .route(
            "/api/game/:game_id/claim-reveal-timeout",
            post(claim_reveal_timeout),
        )
        // System
        .route("/api/system/tick", post(tick))
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
