//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig (log_level, mode)
//!     → logging.rs (global subscriber, JSON or pretty)
//!
//! Shutdown sequence
//!     → correlation.rs (one correlation ID per sequence)
//!     → task-local scope around every shutdown action
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing in PROD and MOCK
//! - Pretty output for DEV and LOCAL
//! - `RUST_LOG` overrides the configured level when set
//! - Nothing is installed implicitly: the binary calls `logging::init` once

pub mod correlation;
pub mod logging;
