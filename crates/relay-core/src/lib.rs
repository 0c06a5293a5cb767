//! # Relay Core
//!
//! Core capability traits and error types for the relay middleware pipeline.
//!
//! This crate defines the two contracts that form the boundary of the
//! pipeline:
//!
//! - [`RequestHandler`] - Anything that turns a request into a response
//! - [`Middleware`] - A step that receives a request plus the rest of the chain
//! - [`PipelineLockedError`] - The only error the pipeline itself declares
//!
//! Request, response and error types are chosen by the host. The pipeline
//! never inspects them; it only moves them between steps.

#![doc(html_root_url = "https://docs.rs/relay-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handler;
mod middleware;

pub use error::{PipelineLockedError, PipelineResult};
pub use handler::{BoxedHandler, FnHandler, RequestHandler};
pub use middleware::{BoxedMiddleware, FnMiddleware, Middleware};
