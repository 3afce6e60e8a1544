use std::time::Duration;

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::utils::CircuitState;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Lookup outcomes (success / each error code) and latency
// - Repository failures by kind
// - Repository circuit breaker state
//
// All metrics are registered on a private registry and scraped via /metrics
// ============================================================================

pub struct LookupMetrics {
    registry: Registry,

    pub lookups_total: IntCounterVec,
    pub lookup_duration: Histogram,
    pub repository_errors: IntCounterVec,
    pub circuit_state: IntGauge,
}

impl LookupMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let lookups_total = IntCounterVec::new(
            Opts::new("customer_lookups_total", "Customer lookups by outcome code"),
            &["code"],
        )?;
        registry.register(Box::new(lookups_total.clone()))?;

        let lookup_duration = Histogram::with_opts(
            HistogramOpts::new(
                "customer_lookup_duration_seconds",
                "End-to-end customer lookup duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(lookup_duration.clone()))?;

        let repository_errors = IntCounterVec::new(
            Opts::new("repository_errors_total", "Repository failures by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(repository_errors.clone()))?;

        let circuit_state = IntGauge::new(
            "repository_circuit_state",
            "Repository circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(circuit_state.clone()))?;

        Ok(Self {
            registry,
            lookups_total,
            lookup_duration,
            repository_errors,
            circuit_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_lookup(&self, outcome: &str, elapsed: Duration) {
        self.lookups_total.with_label_values(&[outcome]).inc();
        self.lookup_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_repository_error(&self, kind: &str) {
        self.repository_errors.with_label_values(&[kind]).inc();
    }

    pub fn set_circuit_state(&self, state: CircuitState) {
        let value = match state {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        };
        self.circuit_state.set(value);
    }

    pub fn lookups_with_outcome(&self, outcome: &str) -> u64 {
        self.lookups_total.with_label_values(&[outcome]).get()
    }

    pub fn repository_errors_of_kind(&self, kind: &str) -> u64 {
        self.repository_errors.with_label_values(&[kind]).get()
    }

    /// Text exposition format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_lookups() {
        let metrics = LookupMetrics::new().unwrap();
        metrics.record_lookup("SUCCESS", Duration::from_millis(3));
        metrics.record_lookup("SUCCESS", Duration::from_millis(4));
        metrics.record_lookup("INVALID_CPF", Duration::from_micros(10));

        let text = metrics.render().unwrap();

        assert!(text.contains("customer_lookups_total{code=\"SUCCESS\"} 2"));
        assert!(text.contains("customer_lookups_total{code=\"INVALID_CPF\"} 1"));
        assert!(text.contains("customer_lookup_duration_seconds_count 3"));
    }

    #[test]
    fn test_circuit_state_gauge() {
        let metrics = LookupMetrics::new().unwrap();

        metrics.set_circuit_state(CircuitState::Open);
        assert_eq!(metrics.circuit_state.get(), 1);

        metrics.set_circuit_state(CircuitState::HalfOpen);
        assert_eq!(metrics.circuit_state.get(), 2);

        metrics.set_circuit_state(CircuitState::Closed);
        assert_eq!(metrics.circuit_state.get(), 0);
    }
}
