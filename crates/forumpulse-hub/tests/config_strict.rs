#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use forumpulse_hub::config::{self, DeliveryPolicy};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
hub:
  listen: "0.0.0.0:8080"
  ping_intervall_ms: 20000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.hub.listen, "0.0.0.0:8080");
    assert_eq!(cfg.hub.outbound_queue_depth, 256);
    assert_eq!(cfg.hub.delivery, DeliveryPolicy::Multiplex);
}

#[test]
fn unsupported_version_is_rejected() {
    let bad = r#"
version: 2
"#;
    config::load_from_str(bad).expect_err("must fail");
}

#[test]
fn ping_interval_range_is_enforced() {
    let bad = r#"
version: 1
hub:
  ping_interval_ms: 1000
"#;
    config::load_from_str(bad).expect_err("must fail");
}

#[test]
fn idle_timeout_must_exceed_ping_interval() {
    let bad = r#"
version: 1
hub:
  ping_interval_ms: 30000
  idle_timeout_ms: 20000
"#;
    config::load_from_str(bad).expect_err("must fail");
}

#[test]
fn queue_depth_range_is_enforced() {
    let bad = r#"
version: 1
hub:
  outbound_queue_depth: 4
"#;
    config::load_from_str(bad).expect_err("must fail");
}

#[test]
fn delivery_policy_parses() {
    let ok = r#"
version: 1
hub:
  delivery: single_active
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.hub.delivery, DeliveryPolicy::SingleActive);

    let bad = r#"
version: 1
hub:
  delivery: newest_wins
"#;
    config::load_from_str(bad).expect_err("must fail");
}
