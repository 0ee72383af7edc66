use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_redact::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so redacted output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            a3s_redact::cli::serve::execute(host.as_deref(), port).await?;
        }
        Commands::Scan { file } => {
            a3s_redact::cli::scan::execute(&file)?;
        }
        Commands::Redact { file, out } => {
            a3s_redact::cli::redact::execute(&file, out.as_deref())?;
        }
        Commands::Decrypt { key, blob } => {
            a3s_redact::cli::decrypt::execute(&key, &blob)?;
        }
        Commands::Restore { key, file } => {
            a3s_redact::cli::restore::execute(&key, &file)?;
        }
    }

    Ok(())
}
