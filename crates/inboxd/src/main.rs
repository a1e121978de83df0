mod cli;
mod config;
mod daemon;
mod protocol;
mod surfaces;

use clap::Parser;

use cli::Cli;
use config::DaemonConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DaemonConfig::resolve(&cli)?;
    daemon::daemon_main(config).await
}
