// Prometheus metrics definitions for the quiz bot.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Users with a session in memory.
    pub static ref ACTIVE_SESSIONS: IntGauge =
        IntGauge::new("kquiz_active_sessions", "Users with a session in memory").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Inbound updates, by kind (start, text, photo, callback, other).
    pub static ref UPDATES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kquiz_updates_total", "Inbound updates handled"),
        &["kind"],
    )
    .unwrap();

    /// Rounds started, by mode.
    pub static ref ROUNDS_STARTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kquiz_rounds_started_total", "Rounds started"),
        &["mode"],
    )
    .unwrap();

    /// Rounds played to the end, by mode.
    pub static ref ROUNDS_COMPLETED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kquiz_rounds_completed_total", "Rounds played to the end"),
        &["mode"],
    )
    .unwrap();

    /// Answers scored, by mode and result (correct, wrong).
    pub static ref ANSWERS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kquiz_answers_total", "Answers scored"),
        &["mode", "result"],
    )
    .unwrap();

    /// Photo uploads, by outcome (stored, duplicate, too_large, limited, failed).
    pub static ref UPLOADS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kquiz_uploads_total", "Photo uploads"),
        &["outcome"],
    )
    .unwrap();

    /// Failed Bot API calls, by method.
    pub static ref TRANSPORT_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kquiz_transport_errors_total", "Failed Bot API calls"),
        &["method"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Time to handle one webhook update end to end.
    pub static ref WEBHOOK_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("kquiz_webhook_duration_seconds", "Webhook handling time in seconds")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(ACTIVE_SESSIONS.clone()),
            Box::new(UPDATES_TOTAL.clone()),
            Box::new(ROUNDS_STARTED_TOTAL.clone()),
            Box::new(ROUNDS_COMPLETED_TOTAL.clone()),
            Box::new(ANSWERS_TOTAL.clone()),
            Box::new(UPLOADS_TOTAL.clone()),
            Box::new(TRANSPORT_ERRORS_TOTAL.clone()),
            Box::new(WEBHOOK_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            REGISTRY.register(c).expect("failed to register metric");
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Label value for an answer result.
pub fn result_label(correct: bool) -> &'static str {
    if correct {
        "correct"
    } else {
        "wrong"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_is_harmless() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_gather_metrics_contains_prefix() {
        register_metrics();
        UPDATES_TOTAL.with_label_values(&["text"]).inc();
        let output = gather_metrics();
        assert!(output.contains("kquiz_updates_total"));
    }

    #[test]
    fn test_metric_increments() {
        ACTIVE_SESSIONS.inc();
        ACTIVE_SESSIONS.dec();

        ROUNDS_STARTED_TOTAL.with_label_values(&["quiz"]).inc();
        ROUNDS_COMPLETED_TOTAL.with_label_values(&["photo_quiz"]).inc();
        ANSWERS_TOTAL
            .with_label_values(&["learn_train", result_label(true)])
            .inc();
        UPLOADS_TOTAL.with_label_values(&["duplicate"]).inc();
        TRANSPORT_ERRORS_TOTAL.with_label_values(&["sendMessage"]).inc();
        WEBHOOK_DURATION_SECONDS.observe(0.02);
    }

    #[test]
    fn test_result_label() {
        assert_eq!(result_label(true), "correct");
        assert_eq!(result_label(false), "wrong");
    }
}
