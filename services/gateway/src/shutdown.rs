//! Graceful shutdown on Ctrl+C or SIGTERM

use tokio::signal;

/// Shutdown trigger; handlers are registered by [`ShutdownSignal::install`]
/// so a signal that arrives before the server starts waiting is not lost.
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: signal::unix::Signal,
}

impl ShutdownSignal {
    /// Must be called from within the tokio runtime
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: signal::unix::signal(signal::unix::SignalKind::terminate())?,
        })
    }

    /// Resolves on the first Ctrl+C or SIGTERM
    pub async fn wait(self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            let mut terminate = self.terminate;
            terminate.recv().await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
            _ = terminate => tracing::info!("SIGTERM received, shutting down"),
        }
    }
}
