//! di-agent service binary.
//!
//! Loads configuration (file, then environment), serves the HTTP API and
//! shuts down cleanly on Ctrl+C. Tracing goes to stderr.

use di_agent::AgentConfig;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AgentConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    tracing::info!(addr = %config.bind_addr(), "di-agent starting");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl+C, shutting down...");
            on_signal.cancel();
        }
    });

    di_agent::serve(config, cancel).await.map_err(|e| {
        tracing::error!(error = %e, "di-agent exited with error");
        anyhow::anyhow!("di-agent failed: {e}")
    })?;

    tracing::info!("di-agent shut down cleanly");
    Ok(())
}
