use crate::config::RedactConfig;
use crate::error::Result;
use crate::server;

/// Execute the `serve` command: start the HTTP server.
pub async fn execute(host: Option<&str>, port: Option<u16>) -> Result<()> {
    let mut config = RedactConfig::load()?;

    // Override config with CLI arguments
    if let Some(host) = host {
        config.host = host.to_string();
    }
    if let Some(port) = port {
        config.port = port;
    }

    println!("A3S Redact server starting...");
    println!("Listening on http://{}", config.bind_address());
    println!("Data directory: {}", config.data_dir.display());
    println!("Press Ctrl+C to stop");

    server::start(config).await
}
