// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;
pub use infrastructure::redis;

// Domain layer
pub mod domain;

pub use domain::message;
pub use domain::text;

// Supporting modules
pub mod telemetry;
