//! Grace period parsing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Grace period used when the configured value cannot be parsed.
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(5);

/// Seconds to wait for shutdown actions before forcing completion.
///
/// Kept as the raw configured text and resolved with [`GracefulTimeout::duration`].
/// The text must be a plain integer number of seconds, with no surrounding
/// whitespace or unit. Anything else (including the empty string) resolves to
/// [`DEFAULT_GRACEFUL_TIMEOUT`]. Negative values resolve to a zero grace period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTimeout", into = "String")]
pub struct GracefulTimeout(String);

impl GracefulTimeout {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the grace period.
    pub fn duration(&self) -> Duration {
        match self.0.parse::<i64>() {
            Ok(secs) => Duration::from_secs(u64::try_from(secs).unwrap_or(0)),
            Err(_) => DEFAULT_GRACEFUL_TIMEOUT,
        }
    }
}

impl From<&str> for GracefulTimeout {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for GracefulTimeout {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<u64> for GracefulTimeout {
    fn from(secs: u64) -> Self {
        Self(secs.to_string())
    }
}

impl From<GracefulTimeout> for String {
    fn from(timeout: GracefulTimeout) -> Self {
        timeout.0
    }
}

impl From<GracefulTimeout> for Duration {
    fn from(timeout: GracefulTimeout) -> Self {
        timeout.duration()
    }
}

/// Config files may carry the timeout as a number or as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Seconds(i64),
    Text(String),
}

impl From<RawTimeout> for GracefulTimeout {
    fn from(raw: RawTimeout) -> Self {
        match raw {
            RawTimeout::Seconds(secs) => Self(secs.to_string()),
            RawTimeout::Text(text) => Self(text),
        }
    }
}
