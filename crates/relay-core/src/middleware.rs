//! Core middleware trait.
//!
//! A [`Middleware`] receives the request together with a handler for the
//! rest of the chain. Calling `next.handle(request)` forwards the request;
//! returning without calling it short-circuits the chain.
//!
//! # Example
//!
//! ```
//! use relay_core::{Middleware, RequestHandler};
//!
//! struct Uppercase;
//!
//! impl Middleware<String, String, String> for Uppercase {
//!     fn name(&self) -> &'static str {
//!         "uppercase"
//!     }
//!
//!     fn process(
//!         &self,
//!         request: String,
//!         next: &dyn RequestHandler<String, String, String>,
//!     ) -> Result<String, String> {
//!         next.handle(request.to_uppercase())
//!     }
//! }
//! ```

use crate::handler::RequestHandler;
use std::sync::Arc;

/// A shared, type-erased middleware that can be stored in a queue.
pub type BoxedMiddleware<Req, Res, E> = Arc<dyn Middleware<Req, Res, E>>;

/// A processing step in the pipeline.
///
/// # Invariants
///
/// - `next` is always present, even for the last middleware (it then
///   leads to the fallback handler)
/// - Calling `next` more than once is allowed and runs the downstream
///   chain again, independently
/// - Errors from `next` should be returned as-is, not swallowed
pub trait Middleware<Req, Res, E>: Send + Sync {
    /// Returns the name of this middleware.
    ///
    /// Used for logging and debugging. Defaults to the Rust type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Processes the request, optionally forwarding it to `next`.
    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E>;
}

impl<Req, Res, E, M> Middleware<Req, Res, E> for Box<M>
where
    M: Middleware<Req, Res, E> + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> {
        (**self).process(request, next)
    }
}

impl<Req, Res, E, M> Middleware<Req, Res, E> for Arc<M>
where
    M: Middleware<Req, Res, E> + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> {
        (**self).process(request, next)
    }
}

/// A middleware that can be created from a function.
///
/// ```
/// use relay_core::{FnHandler, FnMiddleware, Middleware, RequestHandler};
///
/// let tag = FnMiddleware::new("tag", |req: String, next: &dyn RequestHandler<String, String, ()>| {
///     next.handle(format!("[{req}]"))
/// });
/// let fallback = FnHandler::new(|req: String| Ok::<_, ()>(req));
///
/// assert_eq!(tag.name(), "tag");
/// assert_eq!(tag.process("x".to_string(), &fallback), Ok("[x]".to_string()));
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub fn new<Req, Res, E>(name: &'static str, func: F) -> Self
    where
        F: Fn(Req, &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> + Send + Sync,
    {
        Self { name, func }
    }
}

impl<F, Req, Res, E> Middleware<Req, Res, E> for FnMiddleware<F>
where
    F: Fn(Req, &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> {
        (self.func)(request, next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
