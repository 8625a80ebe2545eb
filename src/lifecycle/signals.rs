//! OS signal handling and trigger sources.
//!
//! # Responsibilities
//! - Register handlers for the termination signals (SIGINT, SIGTERM)
//! - Translate signals and cancellation into a single closer trigger
//! - Stop listening once shutdown has completed from another source
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered before the listener task is spawned, so a
//!   signal delivered right after construction is never missed
//! - Registration failure is logged, not fatal: the closer still works
//!   through cancellation and manual triggers

use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::shutdown::Closer;

/// What started a shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// An OS termination signal, by name.
    Signal(&'static str),
    /// The externally owned cancellation token was cancelled.
    Cancellation,
    /// `Closer::close` or `Closer::trigger` was called.
    Manual,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSource::Signal(name) => write!(f, "signal {}", name),
            TriggerSource::Cancellation => write!(f, "context cancellation"),
            TriggerSource::Manual => write!(f, "manual close"),
        }
    }
}

/// Registered handlers for the termination signals.
#[derive(Debug)]
pub struct TerminationSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    /// Install the handlers. Must be called from within a Tokio runtime.
    #[cfg(unix)]
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination signal and return its name.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "Ctrl+C",
            Err(e) => {
                tracing::error!(error = %e, "Ctrl+C handler failed");
                std::future::pending().await
            }
        }
    }
}

/// Spawn a task that triggers `closer` on the first termination signal.
pub(crate) fn spawn_signal_listener(closer: Closer) {
    let mut signals = match TerminationSignals::register() {
        Ok(signals) => signals,
        Err(e) => {
            tracing::error!(error = %e, "failed to register termination signal handlers");
            return;
        }
    };
    let completion = closer.completion();

    tokio::spawn(async move {
        tokio::select! {
            name = signals.recv() => {
                tracing::info!(signal = name, "received syscall signal");
                closer.fire(TriggerSource::Signal(name));
            }
            _ = completion.wait() => {
                tracing::trace!("signal listener stopped");
            }
        }
    });
}

/// Spawn a task that triggers `closer` once `token` is cancelled.
///
/// The token is only observed, never cancelled here.
pub(crate) fn spawn_cancellation_listener(closer: Closer, token: CancellationToken) {
    let completion = closer.completion();

    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::info!("received context cancellation");
                closer.fire(TriggerSource::Cancellation);
            }
            _ = completion.wait() => {
                tracing::trace!("cancellation listener stopped");
            }
        }
    });
}
