//! Logging setup and layered configuration for relay.
//!
//! The pipeline crates emit `tracing` events while dispatching:
//!
//! | Level | Event |
//! |-------|-------|
//! | `trace` | each middleware step, with `middleware`, `step` and `remaining` |
//! | `debug` | the `dispatch` span (field `stages`) and fallback invocation |
//! | `warn` | a building operation rejected because dispatch already started |
//!
//! This crate turns those events into output. [`ConfigLoader`] produces a
//! [`LogConfig`] from defaults, a file and the environment, and
//! [`init_logging`] installs the matching subscriber.
//!
//! # Example
//!
//! ```rust,no_run
//! use relay_telemetry::{init_logging, ConfigLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("relay.toml")?
//!     .with_env_prefix("RELAY")
//!     .load()?;
//!
//! init_logging(&config)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod logging;

pub use error::{ConfigError, TelemetryError};
pub use loader::ConfigLoader;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
