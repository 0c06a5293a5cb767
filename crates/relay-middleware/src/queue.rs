//! Ordered middleware queue.
//!
//! The [`MiddlewareQueue`] holds middleware in processing order. It accepts
//! new entries until the first time it is asked for its next element; from
//! that moment on it is locked and every attempt to extend it fails with
//! [`PipelineLockedError`].
//!
//! Entries live in an `Arc`-shared vector. Cloning a queue is cheap, and the
//! first append on a clone copies the vector (`Arc::make_mut`), so a queue
//! never observes appends made through another handle.

use crate::queue_handler::QueueHandler;
use relay_core::{BoxedMiddleware, Middleware, PipelineLockedError, PipelineResult, RequestHandler};
use std::iter::FusedIterator;
use std::sync::Arc;

/// An ordered, append-until-locked sequence of middleware.
///
/// # Example
///
/// ```
/// use relay_core::{FnMiddleware, RequestHandler};
/// use relay_middleware::MiddlewareQueue;
///
/// let mut queue: MiddlewareQueue<u32, u32, ()> = MiddlewareQueue::new();
/// queue
///     .add(FnMiddleware::new("inc", |n: u32, next: &dyn RequestHandler<u32, u32, ()>| next.handle(n + 1)))
///     .unwrap();
///
/// assert_eq!(queue.len(), 1);
/// assert!(queue.next().is_some());
///
/// // Asking for the next entry locked the queue.
/// assert!(queue.is_locked());
/// assert!(queue
///     .add(FnMiddleware::new("late", |n: u32, next: &dyn RequestHandler<u32, u32, ()>| next.handle(n)))
///     .is_err());
/// ```
pub struct MiddlewareQueue<Req, Res, E> {
    /// Every entry ever added, shared between clones until one of them appends.
    entries: Arc<Vec<BoxedMiddleware<Req, Res, E>>>,

    /// Index of the front element. Only advances once the queue is locked.
    head: usize,

    /// Set on the first call to `next`, never cleared.
    locked: bool,
}

impl<Req, Res, E> MiddlewareQueue<Req, Res, E> {
    /// Creates an empty, unlocked queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            head: 0,
            locked: false,
        }
    }

    /// Appends a middleware to the end of the queue.
    ///
    /// Fails if the queue is locked.
    pub fn add<M>(&mut self, middleware: M) -> PipelineResult<()>
    where
        M: Middleware<Req, Res, E> + 'static,
    {
        self.add_boxed(Arc::new(middleware))
    }

    /// Appends an already shared middleware to the end of the queue.
    pub fn add_boxed(&mut self, middleware: BoxedMiddleware<Req, Res, E>) -> PipelineResult<()> {
        self.ensure_unlocked("add middleware")?;
        Arc::make_mut(&mut self.entries).push(middleware);
        Ok(())
    }

    /// Appends every middleware in order.
    ///
    /// The lock is checked before anything is appended, so a locked queue is
    /// left untouched.
    pub fn seed<I>(&mut self, middlewares: I) -> PipelineResult<()>
    where
        I: IntoIterator<Item = BoxedMiddleware<Req, Res, E>>,
    {
        self.ensure_unlocked("seed middlewares")?;
        for middleware in middlewares {
            self.add_boxed(middleware)?;
        }
        Ok(())
    }

    /// Returns `true` once the queue has been asked for its next element.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns `true` if no middleware remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of middleware already handed out.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.head
    }

    /// Returns the remaining middleware, front first.
    #[must_use]
    pub fn as_slice(&self) -> &[BoxedMiddleware<Req, Res, E>] {
        self.entries.get(self.head..).unwrap_or_default()
    }

    /// Returns the names of the remaining middleware, front first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.as_slice().iter().map(|m| m.name()).collect()
    }

    /// Turns the queue into a self-consuming request handler.
    ///
    /// See [`QueueHandler`] for the dispatch semantics.
    pub fn into_handler<H>(self, fallback: H) -> QueueHandler<Req, Res, E>
    where
        H: RequestHandler<Req, Res, E> + 'static,
    {
        QueueHandler::from_queue(self, Arc::new(fallback))
    }

    fn ensure_unlocked(&self, operation: &'static str) -> PipelineResult<()> {
        if self.locked {
            tracing::warn!(operation, "rejected: middleware queue is locked");
            return Err(PipelineLockedError::new(operation));
        }
        Ok(())
    }
}

impl<Req, Res, E> Iterator for MiddlewareQueue<Req, Res, E> {
    type Item = BoxedMiddleware<Req, Res, E>;

    /// Locks the queue, then pops the front element if there is one.
    ///
    /// The lock is taken even when the queue is already empty.
    fn next(&mut self) -> Option<Self::Item> {
        self.locked = true;
        let middleware = self.entries.get(self.head).cloned()?;
        self.head += 1;
        Some(middleware)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len().saturating_sub(self.head);
        (remaining, Some(remaining))
    }
}

impl<Req, Res, E> ExactSizeIterator for MiddlewareQueue<Req, Res, E> {}

impl<Req, Res, E> FusedIterator for MiddlewareQueue<Req, Res, E> {}

impl<Req, Res, E> Clone for MiddlewareQueue<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            head: self.head,
            locked: self.locked,
        }
    }
}

impl<Req, Res, E> Default for MiddlewareQueue<Req, Res, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res, E> FromIterator<BoxedMiddleware<Req, Res, E>> for MiddlewareQueue<Req, Res, E> {
    /// Builds an unlocked queue seeded with the given middleware, in order.
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware<Req, Res, E>>>(iter: I) -> Self {
        Self {
            entries: Arc::new(iter.into_iter().collect()),
            head: 0,
            locked: false,
        }
    }
}

impl<Req, Res, E> std::fmt::Debug for MiddlewareQueue<Req, Res, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareQueue")
            .field("remaining", &self.names())
            .field("locked", &self.locked)
            .finish()
    }
}
