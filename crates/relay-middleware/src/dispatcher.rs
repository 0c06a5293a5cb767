//! Copy-on-write middleware dispatcher.
//!
//! A [`Dispatcher`] pairs a [`MiddlewareQueue`] with a fallback handler.
//! Building operations never touch the receiver; they return a new
//! dispatcher with its own copy of the queue. Dispatching works on a
//! snapshot of the queue and hands each middleware a locked continuation
//! dispatcher that wraps the rest of the chain.
//!
//! ## Dispatch
//!
//! ```text
//! handle(req)
//!   ├─ lock self, snapshot queue
//!   ├─ snapshot.next() == None  → fallback.handle(req)
//!   └─ snapshot.next() == Some(m)
//!        └─ m.process(req, Continuation(snapshot, fallback))
//!                               └─ handle(req) → … → fallback
//! ```

use crate::pipeline::Pipeline;
use crate::queue::MiddlewareQueue;
use relay_core::{
    BoxedHandler, BoxedMiddleware, Middleware, PipelineLockedError, PipelineResult, RequestHandler,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A buildable middleware chain ending in a fallback handler.
///
/// # Lock discipline
///
/// - `with_*` operations return new, unlocked dispatchers and leave the
///   receiver unchanged
/// - `handle` locks the receiver; building on it afterwards fails with
///   [`PipelineLockedError`]
/// - Dispatchers derived before a `handle` call are not affected by it
///
/// # Example
///
/// ```
/// use relay_core::{FnHandler, FnMiddleware, RequestHandler};
/// use relay_middleware::Dispatcher;
///
/// let base = Dispatcher::new(FnHandler::new(|n: u32| Ok::<_, ()>(n)));
/// let dispatcher = base
///     .with_middleware(FnMiddleware::new("inc", |n: u32, next: &dyn RequestHandler<u32, u32, ()>| {
///         next.handle(n + 1)
///     }))
///     .unwrap();
///
/// assert_eq!(dispatcher.handle(1), Ok(2));
/// assert!(dispatcher.is_locked());
/// assert!(!base.is_locked());
/// ```
pub struct Dispatcher<Req, Res, E> {
    queue: MiddlewareQueue<Req, Res, E>,
    fallback: BoxedHandler<Req, Res, E>,
    locked: AtomicBool,
}

impl<Req, Res, E> Dispatcher<Req, Res, E> {
    /// Creates a dispatcher with an empty, unlocked queue.
    pub fn new<H>(fallback: H) -> Self
    where
        H: RequestHandler<Req, Res, E> + 'static,
    {
        Self::with_shared_fallback(Arc::new(fallback))
    }

    /// Creates a dispatcher from an already shared fallback handler.
    #[must_use]
    pub fn with_shared_fallback(fallback: BoxedHandler<Req, Res, E>) -> Self {
        Self {
            queue: MiddlewareQueue::new(),
            fallback,
            locked: AtomicBool::new(false),
        }
    }

    /// Wraps the rest of a chain that is being dispatched.
    fn continuation(queue: MiddlewareQueue<Req, Res, E>, fallback: BoxedHandler<Req, Res, E>) -> Self {
        Self {
            queue,
            fallback,
            locked: AtomicBool::new(true),
        }
    }

    /// Returns a new dispatcher with `middleware` appended.
    ///
    /// Fails if this dispatcher is locked. The receiver is never modified.
    pub fn with_middleware<M>(&self, middleware: M) -> PipelineResult<Self>
    where
        M: Middleware<Req, Res, E> + 'static,
    {
        self.with_boxed(Arc::new(middleware))
    }

    /// Returns a new dispatcher with an already shared middleware appended.
    pub fn with_boxed(&self, middleware: BoxedMiddleware<Req, Res, E>) -> PipelineResult<Self> {
        self.ensure_unlocked("add middleware")?;
        self.extended(std::iter::once(middleware))
    }

    /// Returns a new dispatcher with every middleware appended, in order.
    ///
    /// Fails if this dispatcher is locked, even for an empty list.
    pub fn with_middleware_queue<I>(&self, middlewares: I) -> PipelineResult<Self>
    where
        I: IntoIterator<Item = BoxedMiddleware<Req, Res, E>>,
    {
        self.ensure_unlocked("seed middlewares")?;
        self.extended(middlewares)
    }

    /// Copies the queue and appends to the copy. The caller checks the lock.
    fn extended<I>(&self, middlewares: I) -> PipelineResult<Self>
    where
        I: IntoIterator<Item = BoxedMiddleware<Req, Res, E>>,
    {
        let mut queue = self.queue.clone();
        queue.seed(middlewares)?;

        Ok(Self {
            queue,
            fallback: Arc::clone(&self.fallback),
            locked: AtomicBool::new(false),
        })
    }

    /// Returns `true` once this dispatcher has handled a request.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Returns the number of queued middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no middleware is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the names of the queued middleware in processing order.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.queue.names()
    }

    /// Returns the fallback handler.
    #[must_use]
    pub fn fallback(&self) -> &BoxedHandler<Req, Res, E> {
        &self.fallback
    }

    /// Freezes the current chain into an immutable [`Pipeline`].
    ///
    /// The dispatcher itself is left unlocked.
    #[must_use]
    pub fn freeze(&self) -> Pipeline<Req, Res, E> {
        Pipeline::from_parts(self.queue.as_slice().into(), Arc::clone(&self.fallback))
    }

    fn ensure_unlocked(&self, operation: &'static str) -> PipelineResult<()> {
        if self.is_locked() {
            tracing::warn!(operation, "rejected: dispatcher is locked");
            return Err(PipelineLockedError::new(operation));
        }
        Ok(())
    }

    fn step(&self, request: Req) -> Result<Res, E> {
        let mut snapshot = self.queue.clone();

        match snapshot.next() {
            Some(middleware) => {
                tracing::trace!(
                    middleware = middleware.name(),
                    step = snapshot.consumed(),
                    remaining = snapshot.len(),
                    "dispatching to middleware"
                );
                let next = Self::continuation(snapshot, Arc::clone(&self.fallback));
                middleware.process(request, &next)
            }
            None => {
                tracing::debug!(step = snapshot.consumed(), "pipeline exhausted, invoking fallback");
                self.fallback.handle(request)
            }
        }
    }
}

impl<Req, Res, E> RequestHandler<Req, Res, E> for Dispatcher<Req, Res, E> {
    fn handle(&self, request: Req) -> Result<Res, E> {
        self.locked.store(true, Ordering::Release);

        // Continuations share the span opened by the outermost dispatcher.
        if self.queue.consumed() > 0 {
            return self.step(request);
        }

        let span = tracing::debug_span!("dispatch", stages = self.queue.len());
        let _entered = span.enter();
        self.step(request)
    }
}

impl<Req, Res, E> Clone for Dispatcher<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            fallback: Arc::clone(&self.fallback),
            locked: AtomicBool::new(self.is_locked()),
        }
    }
}

impl<Req, Res, E> std::fmt::Debug for Dispatcher<Req, Res, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("middleware", &self.middleware_names())
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}
