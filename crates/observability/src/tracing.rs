//! Tracing subscriber initialization: JSON lines for deployments, pretty
//! output for local runs. Falls back to `info` when the filter does not parse.

use depot_infra::{LogConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = match config.format {
        LogFormat::Json => builder.json().with_target(false).try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        let config = LogConfig {
            format: LogFormat::Pretty,
            filter: "depot_infra=debug,not a directive".into(),
        };
        init(&config);
        init(&LogConfig::default());
    }
}
