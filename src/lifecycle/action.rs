//! Shutdown actions: the units of cleanup work run when the closer fires.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

/// Error reported by a failed [`Closable::close`].
pub type CloseError = Box<dyn std::error::Error + Send + Sync>;

/// A resource that must be released on shutdown.
#[async_trait]
pub trait Closable: Send + Sync {
    /// Name used to identify the resource in shutdown logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Release the resource.
    ///
    /// An error is logged by the closer and never stops other actions.
    async fn close(&self) -> Result<(), CloseError>;
}

/// A single registered shutdown action.
pub enum ShutdownAction {
    /// A resource with a fallible close.
    Closable(Arc<dyn Closable>),
    /// A synchronous procedure, run on the blocking pool. A procedure still
    /// running when the runtime is dropped delays that drop until it returns.
    Procedure(Box<dyn FnOnce() + Send + 'static>),
    /// An asynchronous procedure.
    Task(BoxFuture<'static, ()>),
}

impl ShutdownAction {
    pub fn closable(resource: Arc<dyn Closable>) -> Self {
        Self::Closable(resource)
    }

    pub fn procedure<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::Procedure(Box::new(f))
    }

    pub fn task<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Task(Box::pin(fut))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Closable(_) => "closable",
            Self::Procedure(_) => "procedure",
            Self::Task(_) => "task",
        }
    }

    /// Run the action to completion.
    ///
    /// Failures are reported through `tracing` and never returned: a closer
    /// has nobody to hand them to.
    pub async fn run(self) {
        match self {
            Self::Closable(resource) => match resource.close().await {
                Ok(()) => tracing::debug!(resource = resource.name(), "closed"),
                Err(e) => {
                    tracing::error!(resource = resource.name(), error = %e, "failed to close")
                }
            },
            Self::Procedure(f) => {
                if let Err(e) = tokio::task::spawn_blocking(f).await {
                    tracing::error!(error = %e, "shutdown procedure did not finish");
                }
            }
            Self::Task(fut) => fut.await,
        }
    }
}

impl fmt::Debug for ShutdownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closable(resource) => f.debug_tuple("Closable").field(&resource.name()).finish(),
            Self::Procedure(_) => f.write_str("Procedure"),
            Self::Task(_) => f.write_str("Task"),
        }
    }
}

impl<C> From<Arc<C>> for ShutdownAction
where
    C: Closable + 'static,
{
    fn from(resource: Arc<C>) -> Self {
        Self::Closable(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Failing;

    #[async_trait]
    impl Closable for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn close(&self) -> Result<(), CloseError> {
            Err("disk on fire".into())
        }
    }

    struct Flag(AtomicBool);

    #[async_trait]
    impl Closable for Flag {
        async fn close(&self) -> Result<(), CloseError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn closable_is_closed() {
        let flag = Arc::new(Flag(AtomicBool::new(false)));
        ShutdownAction::from(flag.clone()).run().await;
        assert!(flag.0.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn close_error_is_swallowed() {
        // Must return normally; the error only reaches the log.
        ShutdownAction::closable(Arc::new(Failing)).run().await;
    }

    #[tokio::test]
    async fn procedure_runs_on_blocking_pool() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();
        ShutdownAction::procedure(move || called_clone.store(true, Ordering::SeqCst))
            .run()
            .await;
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn panicking_procedure_is_contained() {
        ShutdownAction::procedure(|| panic!("boom")).run().await;
    }

    #[test]
    fn kind_and_debug() {
        let task = ShutdownAction::task(async {});
        assert_eq!(task.kind(), "task");
        assert_eq!(format!("{:?}", task), "Task");

        let closable = ShutdownAction::closable(Arc::new(Failing));
        assert_eq!(closable.kind(), "closable");
        assert_eq!(format!("{:?}", closable), "Closable(\"failing\")");
    }

    #[test]
    fn default_name_is_type_name() {
        let flag = Flag(AtomicBool::new(false));
        assert!(flag.name().ends_with("Flag"));
    }
}
