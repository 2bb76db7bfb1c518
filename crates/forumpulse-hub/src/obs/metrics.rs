//! Minimal metrics registry for the hub.
//!
//! No external dependencies are used; counters and gauges with dynamic labels
//! are backed by `DashMap` + atomics and rendered in Prometheus text format by
//! the `/metrics` handler. Labels are flattened into sorted key vectors to
//! keep deterministic ordering.

use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use dashmap::DashMap;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }
    /// Decrement by 1.
    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

/// Hub-level metric registry, rendered at `/metrics`.
#[derive(Default)]
pub struct HubMetrics {
    pub envelopes_delivered: CounterVec,
    pub deliveries_dropped: CounterVec,
    pub connections_opened: CounterVec,
    pub connections_active: GaugeVec,
}

impl HubMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// One envelope accepted onto a connection queue.
    pub fn envelope_delivered(&self, kind: &str) {
        self.envelopes_delivered.inc(&[("kind", kind)]);
    }

    /// One delivery attempt that reached no queue.
    pub fn delivery_dropped(&self, reason: &str) {
        self.deliveries_dropped.inc(&[("reason", reason)]);
    }

    pub fn connection_opened(&self) {
        self.connections_opened.inc(&[]);
        self.connections_active.inc(&[]);
    }

    pub fn connection_closed(&self) {
        self.connections_active.dec(&[]);
    }

    /// Render all registered metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.envelopes_delivered
            .render("hub_envelopes_delivered_total", &mut out);
        self.deliveries_dropped
            .render("hub_deliveries_dropped_total", &mut out);
        self.connections_opened
            .render("hub_connections_opened_total", &mut out);
        self.connections_active
            .render("hub_connections_active", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_labels_are_order_insensitive() {
        let c = CounterVec::default();
        c.inc(&[("a", "1"), ("b", "2")]);
        c.inc(&[("b", "2"), ("a", "1")]);
        assert_eq!(c.get(&[("a", "1"), ("b", "2")]), 2);
    }

    #[test]
    fn render_includes_type_lines() {
        let m = HubMetrics::new();
        m.envelope_delivered("broadcast");
        m.connection_opened();
        let out = m.render();
        assert!(out.contains("# TYPE hub_envelopes_delivered_total counter"));
        assert!(out.contains("hub_envelopes_delivered_total{kind=\"broadcast\"} 1"));
        assert!(out.contains("hub_connections_active{} 1"));
    }
}
