//! # Relay Middleware
//!
//! Chain-of-responsibility dispatch for synchronous request handling.
//!
//! A chain is an ordered list of [`Middleware`](relay_core::Middleware)
//! ending in a fallback [`RequestHandler`](relay_core::RequestHandler).
//! Each middleware receives the request and the rest of the chain as a
//! single handler; it either forwards or answers on its own.
//!
//! ```text
//! Request → M1 → M2 → … → Mn → Fallback
//!             ↘ short-circuit: M2 answers, M3..Mn and Fallback never run
//! ```
//!
//! ## Building blocks
//!
//! | Type | Role |
//! |------|------|
//! | [`MiddlewareQueue`] | Ordered queue, locks on first read |
//! | [`Dispatcher`] | Copy-on-write builder that is also a handler |
//! | [`Pipeline`] | Frozen chain produced by [`PipelineBuilder`] |
//! | [`QueueHandler`] | One-shot queue that dispatches by consuming itself |
//!
//! ## Locking
//!
//! A [`Dispatcher`] refuses to be extended once it has handled a request,
//! and a [`MiddlewareQueue`] once it has been read. The error is
//! [`PipelineLockedError`](relay_core::PipelineLockedError). A [`Pipeline`]
//! has no way to be extended at all.
//!
//! ## Example
//!
//! ```
//! use relay_core::{FnHandler, FnMiddleware, RequestHandler};
//! use relay_middleware::Dispatcher;
//!
//! let dispatcher = Dispatcher::new(FnHandler::new(|_req: String| Ok::<_, ()>("fallback".to_string())))
//!     .with_middleware(FnMiddleware::new("auth", |req: String, next: &dyn RequestHandler<String, String, ()>| {
//!         if req.starts_with("admin") {
//!             next.handle(req)
//!         } else {
//!             Ok("denied".to_string())
//!         }
//!     }))
//!     .unwrap();
//!
//! assert_eq!(dispatcher.handle("guest".to_string()), Ok("denied".to_string()));
//! ```

#![doc(html_root_url = "https://docs.rs/relay-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod pipeline;
pub mod queue;
pub mod queue_handler;

// Re-export main types at crate root
pub use dispatcher::Dispatcher;
pub use pipeline::{Next, Pipeline, PipelineBuilder};
pub use queue::MiddlewareQueue;
pub use queue_handler::QueueHandler;
