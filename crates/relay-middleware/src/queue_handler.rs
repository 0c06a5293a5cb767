//! Self-consuming queue handler.
//!
//! A [`QueueHandler`] is a middleware queue that is also the request handler
//! for its own chain: each step pops one middleware and hands the handler
//! itself to it as `next`. It is a one-shot object. Once drained, further
//! calls go straight to the fallback.
//!
//! Prefer [`Dispatcher`](crate::Dispatcher) or [`Pipeline`](crate::Pipeline)
//! when the chain is dispatched more than once.

use crate::queue::MiddlewareQueue;
use parking_lot::Mutex;
use relay_core::{BoxedHandler, BoxedMiddleware, Middleware, PipelineResult, RequestHandler};
use std::sync::Arc;

/// A middleware queue that dispatches by consuming itself.
///
/// # Example
///
/// ```
/// use relay_core::{FnHandler, FnMiddleware, RequestHandler};
/// use relay_middleware::MiddlewareQueue;
///
/// let handler = MiddlewareQueue::new()
///     .into_handler(FnHandler::new(|n: u32| Ok::<_, ()>(n)));
/// handler
///     .add(FnMiddleware::new("double", |n: u32, next: &dyn RequestHandler<u32, u32, ()>| next.handle(n * 2)))
///     .unwrap();
///
/// assert_eq!(handler.handle(4), Ok(8));
/// assert!(handler.is_locked());
/// ```
pub struct QueueHandler<Req, Res, E> {
    queue: Mutex<MiddlewareQueue<Req, Res, E>>,
    fallback: BoxedHandler<Req, Res, E>,
}

impl<Req, Res, E> QueueHandler<Req, Res, E> {
    /// Creates an empty queue handler with the given fallback.
    pub fn new<H>(fallback: H) -> Self
    where
        H: RequestHandler<Req, Res, E> + 'static,
    {
        Self::from_queue(MiddlewareQueue::new(), Arc::new(fallback))
    }

    pub(crate) fn from_queue(
        queue: MiddlewareQueue<Req, Res, E>,
        fallback: BoxedHandler<Req, Res, E>,
    ) -> Self {
        Self {
            queue: Mutex::new(queue),
            fallback,
        }
    }

    /// Appends a middleware. Fails once dispatch has started.
    pub fn add<M>(&self, middleware: M) -> PipelineResult<()>
    where
        M: Middleware<Req, Res, E> + 'static,
    {
        self.queue.lock().add(middleware)
    }

    /// Appends every middleware in order. Fails once dispatch has started.
    pub fn seed<I>(&self, middlewares: I) -> PipelineResult<()>
    where
        I: IntoIterator<Item = BoxedMiddleware<Req, Res, E>>,
    {
        self.queue.lock().seed(middlewares)
    }

    /// Returns `true` once the first request has been handled.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.queue.lock().is_locked()
    }

    /// Returns the number of middleware not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<Req, Res, E> RequestHandler<Req, Res, E> for QueueHandler<Req, Res, E> {
    fn handle(&self, request: Req) -> Result<Res, E> {
        // The guard must be released before calling into the middleware,
        // which re-enters this handler through `next`.
        let next = self.queue.lock().next();

        match next {
            Some(middleware) => {
                tracing::trace!(middleware = middleware.name(), "queue handler step");
                middleware.process(request, self)
            }
            None => {
                tracing::debug!("middleware queue drained, invoking fallback");
                self.fallback.handle(request)
            }
        }
    }
}

impl<Req, Res, E> std::fmt::Debug for QueueHandler<Req, Res, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueHandler")
            .field("queue", &*self.queue.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_test::{CallLog, Recording, ShortCircuit, StaticHandler};

    type Handler = QueueHandler<&'static str, String, ()>;

    fn fallback(log: &CallLog) -> StaticHandler<String> {
        StaticHandler::new("fallback", log.clone(), "F".to_string())
    }

    #[test]
    fn test_empty_queue_calls_fallback() {
        let log = CallLog::new();
        let handler: Handler = QueueHandler::new(fallback(&log));

        assert_eq!(handler.handle("req"), Ok("F".to_string()));
        assert_eq!(log.entries(), vec!["fallback"]);
        assert!(handler.is_locked());
    }

    #[test]
    fn test_chain_runs_in_order() {
        let log = CallLog::new();
        let handler: Handler = QueueHandler::new(fallback(&log));
        handler.add(Recording::new("a", log.clone())).unwrap();
        handler.add(Recording::new("b", log.clone())).unwrap();

        assert_eq!(handler.handle("req"), Ok("F".to_string()));
        assert_eq!(log.entries(), vec!["a", "b", "fallback"]);
        assert_eq!(handler.remaining(), 0);
    }

    #[test]
    fn test_short_circuit_leaves_rest_unconsumed() {
        let log = CallLog::new();
        let handler: Handler = QueueHandler::new(fallback(&log));
        handler
            .seed(vec![
                Arc::new(ShortCircuit::new("stop", log.clone(), "S".to_string()))
                    as BoxedMiddleware<_, _, _>,
                Arc::new(Recording::new("never", log.clone())),
            ])
            .unwrap();

        assert_eq!(handler.handle("req"), Ok("S".to_string()));
        assert_eq!(log.entries(), vec!["stop"]);
        assert_eq!(handler.remaining(), 1);
    }

    #[test]
    fn test_add_after_dispatch_fails() {
        let log = CallLog::new();
        let handler: Handler = QueueHandler::new(fallback(&log));
        let _ = handler.handle("req");

        assert!(handler.add(Recording::new("late", log.clone())).is_err());
        assert!(handler.seed(Vec::new()).is_err());
    }

    #[test]
    fn test_into_handler_keeps_seeded_entries() {
        let log = CallLog::new();
        let mut queue = MiddlewareQueue::new();
        queue.add(Recording::new("a", log.clone())).unwrap();

        let handler: Handler = queue.into_handler(fallback(&log));
        assert_eq!(handler.remaining(), 1);
        assert_eq!(handler.handle("req"), Ok("F".to_string()));
        assert_eq!(log.entries(), vec!["a", "fallback"]);
    }
}
