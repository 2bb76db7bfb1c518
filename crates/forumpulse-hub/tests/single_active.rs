//! Single-active delivery policy: a new registration evicts the prior one.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{timeout, Duration};

use forumpulse_hub::config::DeliveryPolicy;
use forumpulse_hub::directory::StaticDirectory;
use forumpulse_hub::hub::{DeliveryOutcome, Hub, HubSettings};
use forumpulse_hub::obs::HubMetrics;

fn build_hub() -> Hub {
    let fixture = Arc::new(
        StaticDirectory::new()
            .with_session("t1", 1)
            .with_session("t2", 2),
    );
    Hub::new(
        HubSettings {
            outbound_queue_depth: 64,
            delivery: DeliveryPolicy::SingleActive,
        },
        fixture.clone(),
        fixture,
        Arc::new(HubMetrics::new()),
    )
}

fn body(v: Value) -> Map<String, Value> {
    v.as_object().unwrap().clone()
}

async fn recv_json(rx: &mut mpsc::Receiver<Message>) -> Value {
    let msg = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("outbound queue closed");
    match msg {
        Message::Text(s) => serde_json::from_str(&s).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn new_registration_evicts_the_oldest_connection() {
    let hub = build_hub();
    let (_c1, _rx1) = hub.register("t1").await.unwrap();
    let (c2a, _rx2a) = hub.register("t2").await.unwrap();
    let (c2b, mut rx2b) = hub.register("t2").await.unwrap();

    assert!(!c2a.is_connected());
    assert!(c2b.is_connected());
    assert_eq!(hub.registry().connection_count(2), 1);

    // Deliveries reach only the surviving connection.
    let outcome = hub
        .router()
        .send_direct(1, 2, body(json!({"content": "second screen wins"})))
        .unwrap();
    assert_eq!(outcome, DeliveryOutcome::Delivered(1));
    let msg = recv_json(&mut rx2b).await;
    assert_eq!(msg["data"]["content"], "second screen wins");
}

#[tokio::test]
async fn replacement_emits_no_presence_events() {
    let hub = build_hub();
    let (_c1, mut rx1) = hub.register("t1").await.unwrap();
    let (_c2a, _rx2a) = hub.register("t2").await.unwrap();

    // t1 saw t2 come online once.
    let status = recv_json(&mut rx1).await;
    assert_eq!(status["type"], "online_status");
    let joined = recv_json(&mut rx1).await;
    assert_eq!(joined["type"], "user_joined");

    // Replacing the connection is invisible to peers: the user never left.
    let (_c2b, _rx2b) = hub.register("t2").await.unwrap();
    assert!(
        matches!(rx1.try_recv(), Err(TryRecvError::Empty)),
        "replacement must not produce presence traffic"
    );
}
