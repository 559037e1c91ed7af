//! Stops the server on SIGINT or SIGTERM, letting open checkouts drain first.

use std::{io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("could not listen for SIGINT: {0}")]
    Interrupt(#[source] io::Error),

    #[cfg(unix)]
    #[error("could not listen for SIGTERM: {0}")]
    Terminate(#[source] io::Error),
}

/// Which signal asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    const fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

#[cfg(unix)]
async fn terminate() -> Result<(), ShutdownSignalError> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(ShutdownSignalError::Terminate)?
        .recv()
        .await;

    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> Result<(), ShutdownSignalError> {
    std::future::pending().await
}

async fn stop_signal() -> Result<StopSignal, ShutdownSignalError> {
    tokio::select! {
        result = signal::ctrl_c() => {
            result.map_err(ShutdownSignalError::Interrupt)?;

            Ok(StopSignal::Interrupt)
        }
        result = terminate() => {
            result?;

            Ok(StopSignal::Terminate)
        }
    }
}

/// Waits for a stop signal, then stops accepting connections.
///
/// Requests already in flight get `grace` to finish; `None` waits for all of them.
pub(crate) async fn listen(
    handle: ServerHandle,
    grace: Option<Duration>,
) -> Result<(), ShutdownSignalError> {
    let signal = stop_signal().await?;

    info!(
        signal = signal.name(),
        grace_secs = grace.map(|grace| grace.as_secs()),
        "stopping checkout server, draining open requests"
    );

    handle.stop_graceful(grace);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_names_match_the_os_names() {
        assert_eq!(StopSignal::Interrupt.name(), "SIGINT");
        assert_eq!(StopSignal::Terminate.name(), "SIGTERM");
    }
}
