//! Correlation IDs for tying log lines to one unit of work.

use std::fmt;
use std::future::Future;
use uuid::Uuid;

tokio::task_local! {
    static CORRELATION_ID: CorrelationId;
}

/// Random identifier attached to a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new random ID (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::generate()
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run `fut` with `id` as the current correlation ID.
pub async fn scope<F>(id: CorrelationId, fut: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(id, fut).await
}

/// The correlation ID of the enclosing [`scope`], if any.
pub fn current() -> Option<CorrelationId> {
    CORRELATION_ID.try_with(Clone::clone).ok()
}
