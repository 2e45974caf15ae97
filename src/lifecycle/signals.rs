//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and, on Unix, SIGTERM both trigger graceful shutdown.

use std::future::Future;

use crate::lifecycle::Shutdown;

/// Wait for the first termination signal and return its name.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

/// Wait for the first termination signal and return its name.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
}

/// Spawn a task that triggers `shutdown` on the first termination signal.
pub fn spawn_signal_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(forward_signal(wait_for_signal(), shutdown))
}

/// Trigger `shutdown` when `signal` resolves. A handler that failed to
/// install leaves the server running.
async fn forward_signal<F>(signal: F, shutdown: Shutdown)
where
    F: Future<Output = std::io::Result<&'static str>>,
{
    match signal.await {
        Ok(name) => {
            tracing::info!(signal = name, "Shutdown signal received");
            shutdown.trigger();
        }
        Err(e) => tracing::error!(
            error = %e,
            "Failed to install signal handler; signals will not stop the server"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_triggers_shutdown() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();

        forward_signal(async { Ok("SIGTERM") }, shutdown.clone()).await;

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("shutdown not triggered");
    }

    #[tokio::test]
    async fn install_failure_keeps_running() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();

        forward_signal(
            async { Err(std::io::Error::other("signal driver unavailable")) },
            shutdown.clone(),
        )
        .await;

        let waited = tokio::time::timeout(Duration::from_millis(100), signal.recv()).await;
        assert!(waited.is_err(), "shutdown fired without a signal");
    }
}
