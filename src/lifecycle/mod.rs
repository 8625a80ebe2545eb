//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (shutdown.rs, action.rs):
//!     add_closable / add_action / add_task → registry (Mutex<Vec<ShutdownAction>>)
//!
//! Triggers (signals.rs):
//!     SIGTERM/SIGINT        ┐
//!     CancellationToken     ├→ Closer::fire (one-shot gate)
//!     Closer::close/trigger ┘
//!
//! Shutdown (shutdown.rs):
//!     Drain registry → spawn one task per action → join barrier
//!     → race barrier against grace period → publish completion (completion.rs)
//! ```
//!
//! # Design Decisions
//! - Actions run concurrently, no ordering between them
//! - Grace period bounds the wait only: late actions are detached, never aborted
//! - Action failures are logged and swallowed, siblings always run
//! - Completion is a single-fire watch value, late observers see it too

pub mod action;
pub mod completion;
pub mod shutdown;
pub mod signals;
pub mod timeout;

pub use action::{Closable, CloseError, ShutdownAction};
pub use completion::{Completion, ShutdownOutcome};
pub use shutdown::{Closer, CloserBuilder};
pub use signals::{TerminationSignals, TriggerSource};
pub use timeout::{GracefulTimeout, DEFAULT_GRACEFUL_TIMEOUT};
