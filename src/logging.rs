//! tracing-subscriber setup for the proxy binary

use crate::config::{LogFormat, ServerConfig};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber; a second call is a no-op
pub fn init(config: &ServerConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_target(false);

    let _ = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    };
}
