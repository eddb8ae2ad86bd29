use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub localization: LocalizationConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Consecutive failures before the circuit opens
    #[serde(default = "default_failure_threshold")]
    pub circuit_breaker_failure_threshold: u32,
    /// Successful probes in half-open state before the circuit closes
    #[serde(default = "default_success_threshold")]
    pub circuit_breaker_success_threshold: u32,
    /// Seconds to wait before probing an open circuit
    #[serde(default = "default_reset_timeout")]
    pub circuit_breaker_reset_timeout_seconds: u64,
    /// Upper bound on establishing a connection
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_ms: u64,
    /// Upper bound on a single command round trip
    #[serde(default = "default_response_timeout")]
    pub response_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizationConfig {
    /// Template store backend: "redis" or "memory"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Prefix shared by every subsystem bucket in Redis
    #[serde(default = "default_bucket_prefix")]
    pub bucket_prefix: String,
    /// Subsystem name appended to the prefix
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Lifetime of a local cache entry in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_success_threshold() -> u32 {
    2
}

fn default_reset_timeout() -> u64 {
    30
}

fn default_connection_timeout() -> u64 {
    2000
}

fn default_response_timeout() -> u64 {
    1000
}

fn default_backend() -> String {
    "redis".to_string()
}

fn default_bucket_prefix() -> String {
    "shared:".to_string()
}

fn default_namespace() -> String {
    "Localization".to_string()
}

fn default_cache_ttl() -> u64 {
    1800 // 30 minutes
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "shared-localization".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("redis.url", default_redis_url())?
            .set_default("localization.backend", default_backend())?
            .set_default("localization.cache_ttl_seconds", default_cache_ttl())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // REDIS_URL, LOCALIZATION_BACKEND, OTEL_ENABLED, ...
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true),
            );

        let builder = MULTI_WORD_KEYS.iter().try_fold(builder, |builder, key| {
            builder.set_override_option(*key, env::var(env_var_name(key)).ok())
        })?;

        builder.build()?.try_deserialize()
    }
}

/// Fields with `_` in their name. The `_`-separated environment source
/// splits these into nested keys, so they are read explicitly.
const MULTI_WORD_KEYS: &[&str] = &[
    "redis.circuit_breaker_failure_threshold",
    "redis.circuit_breaker_success_threshold",
    "redis.circuit_breaker_reset_timeout_seconds",
    "redis.connection_timeout_ms",
    "redis.response_timeout_ms",
    "localization.bucket_prefix",
    "localization.cache_ttl_seconds",
    "otel.service_name",
    "otel.sampling_ratio",
    "otel.log_format",
];

/// `localization.cache_ttl_seconds` -> `LOCALIZATION_CACHE_TTL_SECONDS`
fn env_var_name(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

impl RedisConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl LocalizationConfig {
    /// Name of the Redis hash holding every template
    pub fn bucket(&self) -> String {
        format!("{}{}", self.bucket_prefix, self.namespace)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            circuit_breaker_failure_threshold: default_failure_threshold(),
            circuit_breaker_success_threshold: default_success_threshold(),
            circuit_breaker_reset_timeout_seconds: default_reset_timeout(),
            connection_timeout_ms: default_connection_timeout(),
            response_timeout_ms: default_response_timeout(),
        }
    }
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket_prefix: default_bucket_prefix(),
            namespace: default_namespace(),
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let localization = LocalizationConfig::default();
        assert_eq!(localization.backend, "redis");
        assert_eq!(localization.cache_ttl_seconds, 1800);
        assert_eq!(localization.bucket(), "shared:Localization");

        let redis = RedisConfig::default();
        assert_eq!(redis.url, "redis://localhost:6379");
        assert_eq!(redis.circuit_breaker_failure_threshold, 5);
        assert_eq!(redis.connection_timeout(), Duration::from_secs(2));
        assert_eq!(redis.response_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(
            env_var_name("localization.cache_ttl_seconds"),
            "LOCALIZATION_CACHE_TTL_SECONDS"
        );
        assert_eq!(env_var_name("otel.service_name"), "OTEL_SERVICE_NAME");
        assert_eq!(
            env_var_name("redis.response_timeout_ms"),
            "REDIS_RESPONSE_TIMEOUT_MS"
        );
    }

    #[test]
    fn test_multi_word_fields_read_from_env() {
        env::set_var("LOCALIZATION_CACHE_TTL_SECONDS", "60");
        env::set_var("LOCALIZATION_BUCKET_PREFIX", "network:");
        env::set_var("OTEL_SERVICE_NAME", "lobby-localization");

        let settings = Settings::new().unwrap();

        env::remove_var("LOCALIZATION_CACHE_TTL_SECONDS");
        env::remove_var("LOCALIZATION_BUCKET_PREFIX");
        env::remove_var("OTEL_SERVICE_NAME");

        assert_eq!(settings.localization.cache_ttl_seconds, 60);
        assert_eq!(settings.localization.bucket(), "network:Localization");
        assert_eq!(settings.otel.service_name, "lobby-localization");
    }

    #[test]
    fn test_bucket_uses_prefix_and_namespace() {
        let config = LocalizationConfig {
            bucket_prefix: "network:".to_string(),
            namespace: "Lobby".to_string(),
            ..Default::default()
        };
        assert_eq!(config.bucket(), "network:Lobby");
    }
}
