//! Signal handling for graceful server shutdown.

use tokio::signal;
use tracing::info;

/// Wait for a termination signal (SIGINT/SIGTERM on Unix, Ctrl+C on
/// Windows).
pub async fn wait_for_shutdown() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => {
                info!("received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM");
            }
        }
    }

    #[cfg(windows)]
    {
        signal::ctrl_c().await?;
        info!("received Ctrl+C");
    }

    Ok(())
}
