//! Shutdown coordination for the service.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::lifecycle::action::{Closable, ShutdownAction};
use crate::lifecycle::completion::{Completion, ShutdownOutcome};
use crate::lifecycle::signals::{self, TriggerSource};
use crate::lifecycle::timeout::{GracefulTimeout, DEFAULT_GRACEFUL_TIMEOUT};
use crate::observability::correlation::{self, CorrelationId};

/// Coordinator for graceful shutdown.
///
/// Collects shutdown actions over the life of the process and runs all of
/// them concurrently, exactly once, when the first trigger fires. Completion
/// is published after every action finished or the grace period elapsed,
/// whichever comes first.
///
/// `Closer` is a cheap handle; clones share the same registry and signal.
#[derive(Clone)]
pub struct Closer {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Mutex<Vec<ShutdownAction>>,
    grace_period: Duration,
    triggered: AtomicBool,
    done_tx: watch::Sender<Option<ShutdownOutcome>>,
}

impl Closer {
    /// Create a closer that listens for SIGINT/SIGTERM and for cancellation
    /// of `token`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(token: CancellationToken, graceful_timeout: impl Into<GracefulTimeout>) -> Self {
        Self::builder()
            .graceful_timeout(graceful_timeout)
            .listen_for_signals()
            .cancel_on(token)
            .build()
    }

    pub fn builder() -> CloserBuilder {
        CloserBuilder::default()
    }

    /// Register a resource to close on shutdown.
    pub fn add_closable(&self, resource: Arc<dyn Closable>) {
        self.add(ShutdownAction::Closable(resource));
    }

    /// Register a synchronous procedure to run on shutdown.
    ///
    /// The procedure runs on Tokio's blocking pool and is never interrupted.
    /// If it outlives the grace period, dropping the runtime waits for it to
    /// return. Callers that must exit promptly should tear the runtime down
    /// with [`Runtime::shutdown_timeout`] or [`Runtime::shutdown_background`].
    ///
    /// [`Runtime::shutdown_timeout`]: tokio::runtime::Runtime::shutdown_timeout
    /// [`Runtime::shutdown_background`]: tokio::runtime::Runtime::shutdown_background
    pub fn add_action<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.add(ShutdownAction::procedure(f));
    }

    /// Register an asynchronous procedure to run on shutdown.
    pub fn add_task<Fut>(&self, fut: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.add(ShutdownAction::task(fut));
    }

    /// Register any shutdown action.
    ///
    /// Actions registered once the sequence has started are dropped without
    /// running.
    pub fn add(&self, action: ShutdownAction) {
        let mut registry = self.inner.registry();
        if self.is_triggered() {
            tracing::debug!(kind = action.kind(), "shutdown already triggered, dropping action");
            return;
        }
        registry.push(action);
    }

    /// Number of registered actions not yet handed to the executor.
    pub fn pending_actions(&self) -> usize {
        self.inner.registry().len()
    }

    pub fn grace_period(&self) -> Duration {
        self.inner.grace_period
    }

    /// Whether a trigger has already fired.
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Start the shutdown sequence without waiting for it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn trigger(&self) {
        self.fire(TriggerSource::Manual);
    }

    /// Force shutdown, bypassing system signals, and wait for completion.
    ///
    /// If another trigger already won, this only waits.
    pub async fn close(&self) {
        self.fire(TriggerSource::Manual);
        self.wait().await;
    }

    /// Wait for the shutdown completion signal.
    pub async fn wait(&self) {
        self.completion().wait().await;
    }

    /// Get a handle to the completion signal.
    pub fn completion(&self) -> Completion {
        Completion::new(self.inner.done_tx.subscribe())
    }

    /// The single entry point shared by every trigger source.
    pub(crate) fn fire(&self, source: TriggerSource) {
        if self
            .inner
            .triggered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(source = %source, "shutdown already triggered");
            return;
        }

        let actions = std::mem::take(&mut *self.inner.registry());
        let cid = CorrelationId::generate();
        let span = tracing::info_span!("shutdown", cid = %cid, source = %source);
        tracing::info!(parent: &span, "shutdown triggered");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(actions, cid).await }.instrument(span));
    }
}

impl Inner {
    fn registry(&self) -> MutexGuard<'_, Vec<ShutdownAction>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, actions: Vec<ShutdownAction>, cid: CorrelationId) {
        let jobs = actions.len();

        let handles: Vec<_> = actions
            .into_iter()
            .map(|action| {
                let span = tracing::debug_span!("shutdown_action", kind = action.kind());
                tokio::spawn(correlation::scope(cid.clone(), action.run()).instrument(span))
            })
            .collect();

        // Joined on its own task so a timeout detaches the actions instead of
        // dropping them mid-flight.
        let (all_done_tx, all_done_rx) = oneshot::channel::<()>();
        tokio::spawn(
            async move {
                for result in join_all(handles).await {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "shutdown action panicked");
                    }
                }
                let _ = all_done_tx.send(());
            }
            .in_current_span(),
        );

        tracing::info!(
            timeout_secs = self.grace_period.as_secs_f64(),
            jobs,
            "waiting before terminate or end up earlier if jobs are ready"
        );

        let outcome = tokio::select! {
            biased;
            _ = all_done_rx => {
                tracing::info!("jobs are gracefully closed");
                ShutdownOutcome::Graceful
            }
            _ = tokio::time::sleep(self.grace_period) => {
                tracing::warn!("jobs are not closed due to timeout");
                ShutdownOutcome::TimedOut
            }
        };

        self.done_tx.send_replace(Some(outcome));
    }
}

impl std::fmt::Debug for Closer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closer")
            .field("grace_period", &self.inner.grace_period)
            .field("pending_actions", &self.pending_actions())
            .field("triggered", &self.is_triggered())
            .field("outcome", &*self.inner.done_tx.borrow())
            .finish()
    }
}

/// Builder for [`Closer`], choosing the grace period and trigger sources.
#[derive(Debug)]
pub struct CloserBuilder {
    grace_period: Duration,
    signals: bool,
    token: Option<CancellationToken>,
}

impl Default for CloserBuilder {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACEFUL_TIMEOUT,
            signals: false,
            token: None,
        }
    }
}

impl CloserBuilder {
    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Set the grace period from its configured form.
    pub fn graceful_timeout(self, timeout: impl Into<GracefulTimeout>) -> Self {
        let grace_period = timeout.into().duration();
        self.grace_period(grace_period)
    }

    /// Trigger on SIGINT/SIGTERM (Ctrl+C on non-unix hosts).
    pub fn listen_for_signals(mut self) -> Self {
        self.signals = true;
        self
    }

    /// Trigger once `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Build the closer and start its listeners.
    ///
    /// Must be called from within a Tokio runtime when any listener is enabled.
    pub fn build(self) -> Closer {
        let (done_tx, _) = watch::channel(None);
        let closer = Closer {
            inner: Arc::new(Inner {
                registry: Mutex::new(Vec::new()),
                grace_period: self.grace_period,
                triggered: AtomicBool::new(false),
                done_tx,
            }),
        };

        if self.signals {
            signals::spawn_signal_listener(closer.clone());
        }
        if let Some(token) = self.token {
            signals::spawn_cancellation_listener(closer.clone(), token);
        }

        tracing::debug!(
            grace_period_secs = self.grace_period.as_secs_f64(),
            signals = self.signals,
            "closer created"
        );
        closer
    }
}
