//! Request handler capability.
//!
//! The [`RequestHandler`] trait is the terminal contract of the pipeline.
//! The fallback handler implements it, and so does every view of "the rest
//! of the chain" handed to a middleware. That shared shape is what lets a
//! middleware treat the remaining pipeline exactly like a final destination.

use std::sync::Arc;

/// A shared, type-erased request handler.
pub type BoxedHandler<Req, Res, E> = Arc<dyn RequestHandler<Req, Res, E>>;

/// Turns a request into a response.
///
/// Implementations must always answer: either with a response or with an
/// error. The pipeline never inspects `Req`, `Res` or `E`.
///
/// # Example
///
/// ```
/// use relay_core::{FnHandler, RequestHandler};
/// use std::convert::Infallible;
///
/// let handler = FnHandler::new(|name: String| Ok::<_, Infallible>(format!("hello {name}")));
/// assert_eq!(handler.handle("relay".to_string()).unwrap(), "hello relay");
/// ```
pub trait RequestHandler<Req, Res, E>: Send + Sync {
    /// Handles the request and returns a response or an error.
    fn handle(&self, request: Req) -> Result<Res, E>;
}

impl<Req, Res, E, H> RequestHandler<Req, Res, E> for &H
where
    H: RequestHandler<Req, Res, E> + ?Sized,
{
    fn handle(&self, request: Req) -> Result<Res, E> {
        (**self).handle(request)
    }
}

impl<Req, Res, E, H> RequestHandler<Req, Res, E> for Box<H>
where
    H: RequestHandler<Req, Res, E> + ?Sized,
{
    fn handle(&self, request: Req) -> Result<Res, E> {
        (**self).handle(request)
    }
}

impl<Req, Res, E, H> RequestHandler<Req, Res, E> for Arc<H>
where
    H: RequestHandler<Req, Res, E> + ?Sized,
{
    fn handle(&self, request: Req) -> Result<Res, E> {
        (**self).handle(request)
    }
}

/// A handler built from a closure.
///
/// This allows using plain functions as fallbacks without declaring a type.
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Creates a new function-based handler.
    pub fn new<Req, Res, E>(func: F) -> Self
    where
        F: Fn(Req) -> Result<Res, E> + Send + Sync,
    {
        Self { func }
    }
}

impl<F, Req, Res, E> RequestHandler<Req, Res, E> for FnHandler<F>
where
    F: Fn(Req) -> Result<Res, E> + Send + Sync,
{
    fn handle(&self, request: Req) -> Result<Res, E> {
        (self.func)(request)
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl RequestHandler<u32, u32, String> for Echo {
        fn handle(&self, request: u32) -> Result<u32, String> {
            Ok(request)
        }
    }

    #[test]
    fn test_fn_handler() {
        let handler = FnHandler::new(|n: u32| Ok::<_, String>(n * 2));
        assert_eq!(handler.handle(21), Ok(42));
    }

    #[test]
    fn test_fn_handler_error_passes_through() {
        let handler = FnHandler::new(|_: u32| Err::<u32, _>("boom".to_string()));
        assert_eq!(handler.handle(1), Err("boom".to_string()));
    }

    #[test]
    fn test_smart_pointer_handlers() {
        let boxed: Box<dyn RequestHandler<u32, u32, String>> = Box::new(Echo);
        assert_eq!(boxed.handle(7), Ok(7));

        let shared: BoxedHandler<u32, u32, String> = Arc::new(Echo);
        assert_eq!(shared.handle(8), Ok(8));

        let by_ref = &Echo;
        assert_eq!(by_ref.handle(9), Ok(9));
    }
}
