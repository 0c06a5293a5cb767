//! # Relay
//!
//! **Synchronous chain-of-responsibility middleware pipeline**
//!
//! Relay routes a request through an ordered list of middleware that ends in
//! a fallback handler. Any middleware may answer on its own and skip the rest
//! of the chain. The request, response and error types belong to the host;
//! relay never looks inside them.
//!
//! ```text
//! Request → M1 → M2 → … → Mn → Fallback
//!                                  ↓
//! Response ← M1 ← M2 ← … ← Mn ←────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use relay::prelude::*;
//!
//! let pipeline = Pipeline::builder(FnHandler::new(|n: u64| Ok::<_, String>(n)))
//!     .middleware(FnMiddleware::new("double", |n: u64, next: &dyn RequestHandler<u64, u64, String>| {
//!         next.handle(n * 2)
//!     }))
//!     .middleware(FnMiddleware::new("guard", |n: u64, next: &dyn RequestHandler<u64, u64, String>| {
//!         if n > 100 {
//!             Err(format!("{n} is too large"))
//!         } else {
//!             next.handle(n)
//!         }
//!     }))
//!     .build();
//!
//! assert_eq!(pipeline.handle(21), Ok(42));
//! assert!(pipeline.handle(60).is_err());
//! ```
//!
//! ## Crates
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`core`] | `relay-core` | Handler and middleware traits, adapters, errors |
//! | [`middleware`] | `relay-middleware` | Queue, dispatcher, frozen pipeline |
//! | [`telemetry`] | `relay-telemetry` | Logging setup and configuration loading |

#![doc(html_root_url = "https://docs.rs/relay/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use relay_core as core;

// Re-export dispatch types
pub use relay_middleware as middleware;

// Re-export logging and configuration
pub use relay_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use relay::prelude::*;
///
/// let dispatcher: Dispatcher<(), &str, ()> = Dispatcher::new(FnHandler::new(|()| Ok("ok")));
/// assert_eq!(dispatcher.handle(()), Ok("ok"));
/// ```
pub mod prelude {
    pub use relay_core::{
        BoxedHandler, BoxedMiddleware, FnHandler, FnMiddleware, Middleware, PipelineLockedError,
        PipelineResult, RequestHandler,
    };

    pub use relay_middleware::{
        Dispatcher, MiddlewareQueue, Next, Pipeline, PipelineBuilder, QueueHandler,
    };

    pub use relay_telemetry::{init_logging, ConfigLoader, LogConfig};
}
