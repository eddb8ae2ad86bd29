//! Prometheus metrics for the localization subsystem.
//!
//! - Template cache metrics (hits, misses, remote loads, load failures)
//! - Template lifecycle metrics (registrations, default-content fallbacks)
//! - Redis health metrics

mod helpers;

pub use helpers::{encode_metrics, CacheMetrics, RedisMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "localization";

lazy_static! {
    // ============================================================================
    // Cache Metrics
    // ============================================================================

    /// Lookups answered from a live local entry
    pub static ref CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_cache_hits_total", METRIC_PREFIX),
        "Template lookups served from the local cache"
    ).unwrap();

    /// Lookups that found no live local entry
    pub static ref CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_cache_misses_total", METRIC_PREFIX),
        "Template lookups that required a remote load"
    ).unwrap();

    /// Remote loads by outcome (loaded, not_found, unavailable)
    pub static ref CACHE_LOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_cache_loads_total", METRIC_PREFIX),
        "Remote template loads by outcome",
        &["outcome"]
    ).unwrap();

    /// Remote load latency
    pub static ref CACHE_LOAD_LATENCY: Histogram = register_histogram!(
        format!("{}_cache_load_latency_seconds", METRIC_PREFIX),
        "Remote template load latency in seconds",
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    ).unwrap();

    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Templates registered by this process
    pub static ref TEMPLATES_REGISTERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_templates_registered_total", METRIC_PREFIX),
        "Templates registered by this process"
    ).unwrap();

    /// Remote defaults written because the key was absent
    pub static ref TEMPLATE_DEFAULTS_WRITTEN_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_defaults_written_total", METRIC_PREFIX),
        "Default template contents written to the remote store"
    ).unwrap();

    /// content() calls that fell back to the compiled-in default
    pub static ref TEMPLATE_FALLBACKS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_fallbacks_total", METRIC_PREFIX),
        "Template reads that fell back to default content"
    ).unwrap();

    // ============================================================================
    // Redis Metrics
    // ============================================================================

    /// Redis connection status (1 = connected, 0 = disconnected)
    pub static ref REDIS_CONNECTION_STATUS: IntGauge = register_int_gauge!(
        format!("{}_redis_connection_status", METRIC_PREFIX),
        "Redis connection status (1=connected, 0=disconnected)"
    ).unwrap();

    /// Redis circuit breaker state (0=closed, 1=open, 2=half-open)
    pub static ref REDIS_CIRCUIT_BREAKER_STATE: IntGauge = register_int_gauge!(
        format!("{}_redis_circuit_breaker_state", METRIC_PREFIX),
        "Redis circuit breaker state (0=closed, 1=open, 2=half-open)"
    ).unwrap();
}
