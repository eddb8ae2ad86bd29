use std::sync::Arc;

use anyhow::Result;

use shared_localization::config::Settings;
use shared_localization::error::{self, AppError};
use shared_localization::metrics::encode_metrics;
use shared_localization::message::{create_template_store, MessageRegistry, RenderContext};
use shared_localization::redis::pool::RedisPool;
use shared_localization::telemetry::init_telemetry;
use shared_localization::text::{Audience, Component};

const USAGE: &str = "usage: localization-preview [--metrics] <key> [placeholder=value ...]";

/// Print the Prometheus metrics after rendering
const METRICS_FLAG: &str = "--metrics";

/// Templates this binary registers on startup
const DEFAULT_TEMPLATES: &[(&str, &[&str])] = &[
    ("welcome", &["<gold>Welcome, <name>!", "<gray>Enjoy your stay."]),
    ("balance", &["&aBalance: <bold><amount></bold> coins"]),
    ("farewell", &["<gray>See you soon, <name>."]),
];

/// Prints delivered messages to stdout as plain text and JSON
struct Console;

impl Audience for Console {
    fn id(&self) -> &str {
        "console"
    }

    fn send_message(&self, message: Component) {
        println!("{}", message.plain_text());
        match serde_json::to_string(&message) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(error = %e, "Failed to serialize message"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> error::Result<()> {
    let settings = Settings::new()?;
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let dump_metrics = args.iter().any(|arg| arg == METRICS_FLAG);
    args.retain(|arg| arg != METRICS_FLAG);
    let (key, pairs) = args
        .split_first()
        .ok_or_else(|| AppError::InvalidArgument(USAGE.to_string()))?;

    let redis_pool = if settings.localization.backend == "memory" {
        None
    } else {
        Some(Arc::new(RedisPool::from_config(settings.redis.clone())?))
    };
    let store = create_template_store(&settings.localization, redis_pool);
    let registry = MessageRegistry::new(store, &settings.localization, RenderContext::default());

    for (template_key, lines) in DEFAULT_TEMPLATES {
        registry.register(template_key, *lines).await?;
    }

    let template = match registry.get(key) {
        Some(template) => template,
        None => registry.register(key, [key.as_str()]).await?,
    };

    let mut builder = template.create().await;
    for pair in pairs {
        let (placeholder, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::InvalidArgument(format!("expected name=value, got {}", pair)))?;
        builder = builder.replace(format!("<{}>", placeholder), value);
    }

    builder.send(&Console)?;

    if dump_metrics {
        print!("{}", encode_metrics()?);
    }
    Ok(())
}
