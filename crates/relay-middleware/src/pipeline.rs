//! Frozen middleware pipeline.
//!
//! [`PipelineBuilder`] collects middleware by value and [`PipelineBuilder::build`]
//! freezes them into a [`Pipeline`]. A pipeline has no building operations at
//! all, so there is no lock to check: a frozen chain simply cannot be extended.
//!
//! Dispatch walks the frozen stages with a [`Next`] cursor. Each step borrows
//! the remaining suffix of the stage slice; nothing is copied per request.

use relay_core::{BoxedHandler, BoxedMiddleware, Middleware, RequestHandler};
use std::sync::Arc;

/// An immutable middleware chain ending in a fallback handler.
///
/// # Example
///
/// ```
/// use relay_core::{FnHandler, FnMiddleware, RequestHandler};
/// use relay_middleware::Pipeline;
///
/// let pipeline = Pipeline::builder(FnHandler::new(|s: String| Ok::<_, ()>(s)))
///     .middleware(FnMiddleware::new("trim", |s: String, next: &dyn RequestHandler<String, String, ()>| {
///         next.handle(s.trim().to_string())
///     }))
///     .build();
///
/// assert_eq!(pipeline.stage_names(), vec!["trim"]);
/// assert_eq!(pipeline.handle("  hi  ".to_string()), Ok("hi".to_string()));
/// ```
pub struct Pipeline<Req, Res, E> {
    /// Middleware stages in processing order.
    stages: Arc<[BoxedMiddleware<Req, Res, E>]>,

    /// Terminal handler invoked when every stage forwarded.
    fallback: BoxedHandler<Req, Res, E>,
}

impl<Req, Res, E> Pipeline<Req, Res, E> {
    /// Creates a new pipeline builder with the given fallback.
    pub fn builder<H>(fallback: H) -> PipelineBuilder<Req, Res, E>
    where
        H: RequestHandler<Req, Res, E> + 'static,
    {
        PipelineBuilder::new(fallback)
    }

    pub(crate) fn from_parts(
        stages: Arc<[BoxedMiddleware<Req, Res, E>]>,
        fallback: BoxedHandler<Req, Res, E>,
    ) -> Self {
        Self { stages, fallback }
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the fallback handler.
    #[must_use]
    pub fn fallback(&self) -> &BoxedHandler<Req, Res, E> {
        &self.fallback
    }

    /// Returns a cursor positioned at the first stage.
    #[must_use]
    pub fn chain(&self) -> Next<'_, Req, Res, E> {
        Next {
            remaining: &self.stages,
            fallback: &*self.fallback,
            consumed: 0,
        }
    }
}

impl<Req, Res, E> RequestHandler<Req, Res, E> for Pipeline<Req, Res, E> {
    fn handle(&self, request: Req) -> Result<Res, E> {
        let span = tracing::debug_span!("dispatch", stages = self.stages.len());
        let _entered = span.enter();
        self.chain().handle(request)
    }
}

impl<Req, Res, E> Clone for Pipeline<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            stages: Arc::clone(&self.stages),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl<Req, Res, E> std::fmt::Debug for Pipeline<Req, Res, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// The rest of a frozen chain, as seen by the middleware currently running.
///
/// Calling [`handle`](RequestHandler::handle) runs the first remaining
/// stage, or the fallback once no stage remains. A `Next` can be called
/// more than once; each call is an independent traversal of the suffix.
pub struct Next<'a, Req, Res, E> {
    remaining: &'a [BoxedMiddleware<Req, Res, E>],
    fallback: &'a dyn RequestHandler<Req, Res, E>,
    consumed: usize,
}

impl<Req, Res, E> Next<'_, Req, Res, E> {
    /// Returns the number of stages left before the fallback.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl<Req, Res, E> RequestHandler<Req, Res, E> for Next<'_, Req, Res, E> {
    fn handle(&self, request: Req) -> Result<Res, E> {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                let step = self.consumed + 1;
                tracing::trace!(
                    middleware = middleware.name(),
                    step,
                    remaining = rest.len(),
                    "dispatching to middleware"
                );
                let next = Next {
                    remaining: rest,
                    fallback: self.fallback,
                    consumed: step,
                };
                middleware.process(request, &next)
            }
            None => {
                tracing::debug!(step = self.consumed, "pipeline exhausted, invoking fallback");
                self.fallback.handle(request)
            }
        }
    }
}

impl<Req, Res, E> Clone for Next<'_, Req, Res, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Req, Res, E> Copy for Next<'_, Req, Res, E> {}

/// Builder for constructing a [`Pipeline`].
///
/// Stages are appended by value; the builder is consumed by
/// [`build`](PipelineBuilder::build).
pub struct PipelineBuilder<Req, Res, E> {
    stages: Vec<BoxedMiddleware<Req, Res, E>>,
    fallback: BoxedHandler<Req, Res, E>,
}

impl<Req, Res, E> PipelineBuilder<Req, Res, E> {
    /// Creates a builder with no stages.
    pub fn new<H>(fallback: H) -> Self
    where
        H: RequestHandler<Req, Res, E> + 'static,
    {
        Self {
            stages: Vec::new(),
            fallback: Arc::new(fallback),
        }
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn middleware<M>(self, middleware: M) -> Self
    where
        M: Middleware<Req, Res, E> + 'static,
    {
        self.boxed(Arc::new(middleware))
    }

    /// Appends an already shared middleware stage.
    #[must_use]
    pub fn boxed(mut self, middleware: BoxedMiddleware<Req, Res, E>) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Appends every middleware in order.
    #[must_use]
    pub fn middlewares<I>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = BoxedMiddleware<Req, Res, E>>,
    {
        self.stages.extend(middlewares);
        self
    }

    /// Freezes the stages into a [`Pipeline`].
    #[must_use]
    pub fn build(self) -> Pipeline<Req, Res, E> {
        Pipeline::from_parts(self.stages.into(), self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_test::{CallLog, Recording, Replay, ShortCircuit, StaticHandler};

    type TestPipeline = PipelineBuilder<&'static str, String, ()>;

    fn builder(log: &CallLog) -> TestPipeline {
        Pipeline::builder(StaticHandler::new("F", log.clone(), "F".to_string()))
    }

    #[test]
    fn test_pipeline_executes_in_order() {
        let log = CallLog::new();
        let pipeline = builder(&log)
            .middleware(Recording::new("first", log.clone()))
            .middleware(Recording::new("second", log.clone()))
            .middleware(Recording::new("third", log.clone()))
            .build();

        assert_eq!(pipeline.handle("req"), Ok("F".to_string()));
        assert_eq!(log.entries(), vec!["first", "second", "third", "F"]);
    }

    #[test]
    fn test_empty_pipeline() {
        let log = CallLog::new();
        let pipeline = builder(&log).build();

        assert_eq!(pipeline.stage_count(), 0);
        assert_eq!(pipeline.handle("req"), Ok("F".to_string()));
        assert_eq!(log.count("F"), 1);
    }

    #[test]
    fn test_short_circuit() {
        let log = CallLog::new();
        let pipeline = builder(&log)
            .middleware(Recording::new("A", log.clone()))
            .middleware(ShortCircuit::new("B", log.clone(), "B".to_string()))
            .middleware(Recording::new("C", log.clone()))
            .build();

        assert_eq!(pipeline.handle("R"), Ok("B".to_string()));
        assert_eq!(log.entries(), vec!["A", "B"]);
    }

    #[test]
    fn test_next_called_twice_runs_suffix_twice() {
        let log = CallLog::new();
        let pipeline = builder(&log)
            .middleware(Replay::new("twice", log.clone()))
            .middleware(Recording::new("inner", log.clone()))
            .build();

        assert_eq!(pipeline.handle("req"), Ok("F".to_string()));
        assert_eq!(log.entries(), vec!["twice", "inner", "F", "inner", "F"]);
    }

    #[test]
    fn test_middlewares_bulk_append() {
        let log = CallLog::new();
        let pipeline = builder(&log)
            .middleware(Recording::new("a", log.clone()))
            .middlewares(vec![
                Arc::new(Recording::new("b", log.clone())) as BoxedMiddleware<_, _, _>,
                Arc::new(Recording::new("c", log.clone())),
            ])
            .build();

        assert_eq!(pipeline.stage_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clone_shares_stages() {
        let log = CallLog::new();
        let pipeline = builder(&log)
            .middleware(Recording::new("a", log.clone()))
            .build();
        let copy = pipeline.clone();

        assert_eq!(copy.stage_names(), pipeline.stage_names());
        assert_eq!(copy.handle("req"), Ok("F".to_string()));
    }

    #[test]
    fn test_next_remaining() {
        let log = CallLog::new();
        let pipeline = builder(&log)
            .middleware(Recording::new("a", log.clone()))
            .middleware(Recording::new("b", log.clone()))
            .build();

        assert_eq!(pipeline.chain().remaining(), 2);
    }
}
