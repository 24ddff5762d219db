use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    emergencies_total: AtomicU64,
    fallback_total: AtomicU64,
    mood_entries_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub emergencies_total: u64,
    pub fallback_total: u64,
    pub mood_entries_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("solace_requests_total").increment(1);
    }

    /// Counts one classified turn under its intent label.
    pub fn record_intent(&self, intent: &'static str) {
        metrics::counter!("solace_intents_total", "intent" => intent).increment(1);
    }

    pub fn inc_emergency(&self) {
        self.emergencies_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("solace_emergencies_total").increment(1);
    }

    pub fn inc_fallback(&self) {
        self.fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("solace_fallback_total").increment(1);
    }

    pub fn inc_mood_entry(&self) {
        self.mood_entries_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("solace_mood_entries_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        metrics::histogram!("solace_response_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            emergencies_total: self.emergencies_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            mood_entries_total: self.mood_entries_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    init_tracing_with_default(&format!(
        "{}=info,solace_api=info,solace_engine=info",
        service_name
    ));
}

/// JSON logs on stderr so stdout stays free for program output. `RUST_LOG`
/// overrides `default_directives`.
pub fn init_tracing_with_default(default_directives: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives));

        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_latency_over_requests() {
        let metrics = AppMetrics::default();
        assert_eq!(metrics.snapshot().avg_latency_millis, 0.0);

        metrics.inc_request();
        metrics.inc_request();
        metrics.observe_latency(Duration::from_millis(30));
        metrics.observe_latency(Duration::from_millis(10));
        metrics.inc_emergency();
        metrics.inc_fallback();
        metrics.inc_mood_entry();
        metrics.record_intent("crisis");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.emergencies_total, 1);
        assert_eq!(snapshot.fallback_total, 1);
        assert_eq!(snapshot.mood_entries_total, 1);
        assert_eq!(snapshot.avg_latency_millis, 20.0);
    }
}
