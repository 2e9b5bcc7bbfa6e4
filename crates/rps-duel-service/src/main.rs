//! Arena service binary.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rps_duel_service::{create_app, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new();

    // Pre-register demo players
    let alice = state.register_player("alice".to_string());
    let bob = state.register_player("bob".to_string());
    tracing::info!("Demo player alice: {}", alice.id);
    tracing::info!("Demo player bob: {}", bob.id);

    let app = create_app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Arena service starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
