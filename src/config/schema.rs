//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::config::mode::Mode;
use crate::lifecycle::timeout::GracefulTimeout;
use crate::observability::logging::LogLevel;

/// Root configuration shared by every service built on this crate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service identifier for logs.
    pub service_name: String,

    /// Service version for logs.
    pub service_version: String,

    /// Seconds to wait for shutdown actions (string or integer).
    pub closer_graceful_timeout: GracefulTimeout,

    /// Log level (DEBUG, INFO, WARN, ERROR).
    pub log_level: LogLevel,

    /// Deployment mode (PROD, DEV, MOCK, LOCAL).
    pub mode: Mode,
}
