mod settings;

pub use settings::{LocalizationConfig, OtelConfig, RedisConfig, Settings};
