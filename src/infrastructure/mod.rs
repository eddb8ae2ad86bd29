//! Infrastructure layer modules
//!
//! - `config`: application configuration and settings
//! - `error`: startup error type for the binary
//! - `metrics`: Prometheus metrics helpers
//! - `redis`: Redis connection pool, circuit breaker, and health checks

pub mod config;
pub mod error;
pub mod metrics;
pub mod redis;
