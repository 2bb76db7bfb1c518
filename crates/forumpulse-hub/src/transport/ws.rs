//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS, rejecting the handshake with 401 before any hub
//!   state is touched when the session token does not resolve
//! - Register the connection with the hub and run its session loop
//! - Lifecycle: ping/pong + idle timeout
//! - Decode-once, then hand routing intents to the hub

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::time::{Duration, MissedTickBehavior};

use forumpulse_core::error::Result;
use forumpulse_core::protocol::{ChatPayload, Envelope};
use forumpulse_core::UserId;

use crate::app_state::AppState;
use crate::transport::codec::{decode, Inbound};

/// Cookie carrying the session token on the upgrade request.
pub const SESSION_COOKIE: &str = "session_token";

fn error_json(code: &str, msg: &str) -> String {
    json!({
        "type": "error",
        "data": {
            "code": code,
            "msg": msg
        }
    })
    .to_string()
}

pub async fn ws_upgrade(
    State(app): State<AppState>,
    jar: CookieJar,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    if app.hub().authenticate(&token).await.is_err() {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(app, token, socket).await {
            tracing::debug!(error = %e, "session ended with error");
        }
    })
}

/// Core session loop: one task per live connection.
///
/// The loop owns the socket halves; everything else reaches this connection
/// only through the registry handle and its outbound queue.
async fn run_session(app: AppState, token: String, socket: WebSocket) -> Result<()> {
    // The token is re-validated here: it may have been revoked between the
    // handshake check and the upgrade completing.
    let (conn, mut out_rx) = app.hub().register(&token).await?;
    let user_id = conn.user_id();

    let (mut ws_tx, mut ws_rx) = socket.split();

    let hub_cfg = &app.cfg().hub;
    let ping_every = Duration::from_millis(hub_cfg.ping_interval_ms);
    let idle_timeout = Duration::from_millis(hub_cfg.idle_timeout_ms);

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                conn.touch();

                let inbound = match decode(msg) {
                    Ok(inbound) => inbound,
                    Err(e) => {
                        let code = e.client_code().as_str();
                        let _ = ws_tx.send(Message::Text(error_json(code, &e.to_string()))).await;
                        continue;
                    }
                };

                match inbound {
                    Inbound::Envelope(env) => {
                        if let Some(reply) = route_inbound(&app, user_id, env).await {
                            let _ = ws_tx.send(Message::Text(reply)).await;
                        }
                    }
                    Inbound::Ping(payload) => {
                        let _ = ws_tx.send(Message::Pong(payload)).await;
                    }
                    Inbound::Pong(_) => {}
                    Inbound::Close => break,
                }
            }

            // ping
            _ = ping_tick.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            // lifecycle check: the router (overflow) or the hub (eviction) may
            // have closed this connection from outside the session task
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if !conn.is_connected() {
                    break;
                }
                if conn.idle_for() >= idle_timeout {
                    let _ = ws_tx.send(Message::Text(error_json("TIMEOUT", "idle timeout"))).await;
                    break;
                }
            }
        }
    }

    app.hub().unregister(&conn);

    // Best-effort final flush of whatever the router already queued.
    out_rx.close();
    while let Some(m) = out_rx.recv().await {
        if ws_tx.send(m).await.is_err() {
            break;
        }
    }
    conn.mark_closed();

    Ok(())
}

/// Map one inbound envelope to a hub operation. The sender identity always
/// comes from the authenticated session, never from the payload. Returns an
/// error frame to echo back, if any.
async fn route_inbound(app: &AppState, user_id: UserId, env: Envelope) -> Option<String> {
    let hub = app.hub();
    match env {
        Envelope::PrivateMessage(p) => {
            let Some(recipient) = p.recipient_id else {
                return Some(error_json("BAD_REQUEST", "private_message requires recipient_id"));
            };
            // Offline recipient is a silent drop, not an error.
            let _ = hub.router().send_direct(user_id, recipient, p.body);
            None
        }
        Envelope::Message(p) => {
            let Some(conversation) = p.conversation_id else {
                return Some(error_json("BAD_REQUEST", "message requires conversation_id"));
            };
            let _ = hub
                .router()
                .send_to_conversation(user_id, conversation, p.body)
                .await;
            None
        }
        Envelope::Broadcast(p) => {
            let env = Envelope::Broadcast(ChatPayload {
                sender_id: Some(user_id),
                ..ChatPayload::from_body(p.body)
            });
            let _ = hub.router().broadcast_envelope(&env, Some(user_id));
            None
        }
        Envelope::TypingIndicator(p) => {
            let Some(conversation) = p.conversation_id else {
                return Some(error_json("BAD_REQUEST", "typing_indicator requires conversation_id"));
            };
            let _ = hub.typing().typing(user_id, conversation, p.is_typing).await;
            None
        }
        Envelope::OnlineStatus(_)
        | Envelope::ConversationUpdate(_)
        | Envelope::UserJoined(_)
        | Envelope::UserLeft(_) => Some(error_json(
            "BAD_REQUEST",
            "server-originated envelope type",
        )),
    }
}
