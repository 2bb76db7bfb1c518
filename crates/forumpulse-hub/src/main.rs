//! forumpulse hub binary.
//!
//! Realtime connection hub for the surrounding forum application:
//! - WebSocket endpoint: /v1/ws (session token in the `session_token` cookie)
//! - Direct / broadcast / conversation-scoped routing, presence, typing
//! - Heartbeat ping + idle timeout
//!
//! Runs with in-memory dev collaborators; a production deployment replaces
//! them with the forum's session store and conversation tables.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use forumpulse_hub::{app_state, config, directory::StaticDirectory, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_file("forumpulse.yaml").expect("config load failed");
    let listen: SocketAddr = cfg
        .hub
        .listen
        .parse()
        .expect("hub.listen must be a valid SocketAddr");

    // Dev fixture: token "dev" resolves to user 1, conversation 1 holds users
    // 1 and 2.
    let fixture = Arc::new(
        StaticDirectory::new()
            .with_session("dev", 1)
            .with_conversation(1, &[1, 2]),
    );
    let state = app_state::AppState::new(cfg, fixture.clone(), fixture);

    let app = router::build_router(state);

    tracing::info!(%listen, "forumpulse-hub starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
