//! Relay server command handler

use crate::config::Config;
use crate::error::Result;
use crate::relay;

/// Run the relay server until the process is interrupted
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `host` - Optional override for the bind host
/// * `port` - Optional override for the bind port
pub async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    apply_overrides(&mut config, host, port);

    relay::metrics::init_metrics_exporter();

    relay::serve(&config).await
}

fn apply_overrides(config: &mut Config, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}
