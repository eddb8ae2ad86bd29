//! Helper functions for recording metrics

use prometheus::{Encoder, TextEncoder};

use super::*;

/// Encode all metrics in Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template cache metrics
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit() {
        CACHE_HITS_TOTAL.inc();
    }

    pub fn record_miss() {
        CACHE_MISSES_TOTAL.inc();
    }

    /// Record a remote load outcome with its latency
    pub fn record_load(outcome: &str, elapsed_secs: f64) {
        CACHE_LOADS_TOTAL.with_label_values(&[outcome]).inc();
        CACHE_LOAD_LATENCY.observe(elapsed_secs);
    }
}

/// Helper struct for template lifecycle metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    pub fn record_registered(default_written: bool) {
        TEMPLATES_REGISTERED_TOTAL.inc();
        if default_written {
            TEMPLATE_DEFAULTS_WRITTEN_TOTAL.inc();
        }
    }

    pub fn record_fallback() {
        TEMPLATE_FALLBACKS_TOTAL.inc();
    }
}

/// Helper struct for Redis health metrics
pub struct RedisMetrics;

impl RedisMetrics {
    pub fn set_connected(connected: bool) {
        REDIS_CONNECTION_STATUS.set(if connected { 1 } else { 0 });
    }

    /// Update circuit breaker gauge (0=closed, 1=open, 2=half-open)
    pub fn set_circuit_state(state: i64) {
        REDIS_CIRCUIT_BREAKER_STATE.set(state);
    }
}
