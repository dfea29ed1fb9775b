//! Prometheus counters for the HTTP surface and the chat proxy.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Registry, TextEncoder};
use std::sync::OnceLock;
use tracing::warn;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static ACTIVE_STREAMS: OnceLock<IntGauge> = OnceLock::new();
static UPSTREAM_FAILURES: OnceLock<IntCounter> = OnceLock::new();

pub fn init_metrics() {
    if let Err(e) = try_init_metrics() {
        warn!("Metrics disabled: {}", e);
    }
}

fn try_init_metrics() -> prometheus::Result<()> {
    if REQ_COUNTER.get().is_none() {
        let counter = IntCounterVec::new(
            prometheus::opts!("requests_total", "Total requests per route"),
            &["route", "status"],
        )?;
        if REQ_COUNTER.set(counter.clone()).is_ok() {
            REGISTRY.register(Box::new(counter)).ok();
        }
    }

    if ACTIVE_STREAMS.get().is_none() {
        let gauge = IntGauge::new("active_chat_streams", "Chat responses currently streaming")?;
        if ACTIVE_STREAMS.set(gauge.clone()).is_ok() {
            REGISTRY.register(Box::new(gauge)).ok();
        }
    }

    if UPSTREAM_FAILURES.get().is_none() {
        let counter = IntCounter::new(
            "chat_upstream_failures_total",
            "Chat requests the language-model provider failed",
        )?;
        if UPSTREAM_FAILURES.set(counter.clone()).is_ok() {
            REGISTRY.register(Box::new(counter)).ok();
        }
    }

    Ok(())
}

pub fn inc_request(route: &str, status: u16) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, &status.to_string()]).inc();
    }
}

pub fn inc_streams() {
    if let Some(gauge) = ACTIVE_STREAMS.get() {
        gauge.inc();
    }
}

pub fn dec_streams() {
    if let Some(gauge) = ACTIVE_STREAMS.get() {
        gauge.dec();
    }
}

pub fn inc_upstream_failure() {
    if let Some(counter) = UPSTREAM_FAILURES.get() {
        counter.inc();
    }
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain")],
            format!("failed to encode metrics: {}", e).into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
}
