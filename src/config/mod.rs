//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (non-empty variables win)
//!     → ServiceConfig (immutable, passed down explicitly)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment variables take precedence over file values
//! - No process-wide state: mode and log level travel inside ServiceConfig

pub mod loader;
pub mod mode;
pub mod schema;

pub use loader::{load_config, load_config_with, ConfigError};
pub use mode::{Mode, ModeError};
pub use schema::ServiceConfig;
