use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `log_level`.
/// Calling it again after a subscriber is set is a no-op.
pub fn init_tracing(config: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = Registry::default().with(env_filter);

    let result = if config.json {
        registry
            .with(fmt::layer().with_target(true).json())
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init()
    };
    if let Err(err) = result {
        let msg = err.to_string();
        if !msg.contains("already been set") {
            eprintln!("failed to initialize tracing: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let cfg = LogConfig::default();
        init_tracing(&cfg);
        init_tracing(&LogConfig {
            json: true,
            ..cfg
        });
    }
}
