//! Redis access for the shared template store
//!
//! - `CircuitBreaker`: fails fast while Redis is unavailable
//! - `RedisHealth`: tracks connection health status
//! - `pool`: multiplexed connection with hash command helpers

mod circuit_breaker;
mod health;
pub mod pool;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use health::{RedisHealth, RedisHealthStatus};

/// Get current time in milliseconds since epoch
pub(crate) fn current_time_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
