//! Graceful shutdown coordination for long-running Tokio services.

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use lifecycle::{
    Closable, CloseError, Closer, Completion, GracefulTimeout, ShutdownAction, ShutdownOutcome,
};
