//! # Relay Test
//!
//! Test fixtures for relay pipelines.
//!
//! Every fixture writes its name to a shared [`CallLog`] when it runs, so a
//! test can assert exactly which steps ran and in which order.
//!
//! ## Example
//!
//! ```
//! use relay_core::{Middleware, RequestHandler};
//! use relay_test::{CallLog, Recording, StaticHandler};
//!
//! let log = CallLog::new();
//! let fallback = StaticHandler::new("fallback", log.clone(), "done");
//! let step = Recording::new("step", log.clone());
//!
//! let next: &dyn RequestHandler<&str, &str, ()> = &fallback;
//! assert_eq!(step.process("req", next), Ok("done"));
//! assert_eq!(log.entries(), vec!["step", "fallback"]);
//! ```

#![doc(html_root_url = "https://docs.rs/relay-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod handler;
mod log;
mod middleware;

pub use handler::{EchoHandler, FailingHandler, StaticHandler};
pub use log::CallLog;
pub use middleware::{Failing, Recording, Replay, ShortCircuit};
