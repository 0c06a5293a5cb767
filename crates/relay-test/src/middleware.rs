//! Middleware fixtures.

use crate::log::CallLog;
use relay_core::{Middleware, RequestHandler};

/// Records its name, then forwards the request unchanged.
#[derive(Debug, Clone)]
pub struct Recording {
    name: &'static str,
    log: CallLog,
}

impl Recording {
    /// Creates a forwarding middleware that records into `log`.
    #[must_use]
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self { name, log }
    }
}

impl<Req, Res, E> Middleware<Req, Res, E> for Recording {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> {
        self.log.record(self.name);
        next.handle(request)
    }
}

/// Records its name and answers with a canned response, never calling `next`.
#[derive(Debug, Clone)]
pub struct ShortCircuit<Res> {
    name: &'static str,
    log: CallLog,
    response: Res,
}

impl<Res> ShortCircuit<Res> {
    /// Creates a short-circuiting middleware.
    #[must_use]
    pub fn new(name: &'static str, log: CallLog, response: Res) -> Self {
        Self {
            name,
            log,
            response,
        }
    }
}

impl<Req, Res, E> Middleware<Req, Res, E> for ShortCircuit<Res>
where
    Res: Clone + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, _request: Req, _next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> {
        self.log.record(self.name);
        Ok(self.response.clone())
    }
}

/// Records its name and fails with a canned error, never calling `next`.
#[derive(Debug, Clone)]
pub struct Failing<E> {
    name: &'static str,
    log: CallLog,
    error: E,
}

impl<E> Failing<E> {
    /// Creates a failing middleware.
    #[must_use]
    pub fn new(name: &'static str, log: CallLog, error: E) -> Self {
        Self { name, log, error }
    }
}

impl<Req, Res, E> Middleware<Req, Res, E> for Failing<E>
where
    E: Clone + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, _request: Req, _next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> {
        self.log.record(self.name);
        Err(self.error.clone())
    }
}

/// Records its name and calls `next` twice, returning the second response.
///
/// Errors from the first call are returned immediately.
#[derive(Debug, Clone)]
pub struct Replay {
    name: &'static str,
    log: CallLog,
}

impl Replay {
    /// Creates a replaying middleware.
    #[must_use]
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self { name, log }
    }
}

impl<Req, Res, E> Middleware<Req, Res, E> for Replay
where
    Req: Clone,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, request: Req, next: &dyn RequestHandler<Req, Res, E>) -> Result<Res, E> {
        self.log.record(self.name);
        next.handle(request.clone())?;
        next.handle(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StaticHandler;

    type Next<'a> = &'a dyn RequestHandler<u8, &'static str, &'static str>;

    #[test]
    fn test_recording_forwards() {
        let log = CallLog::new();
        let fallback = StaticHandler::new("F", log.clone(), "F");
        let next: Next<'_> = &fallback;

        assert_eq!(Recording::new("m", log.clone()).process(1, next), Ok("F"));
        assert_eq!(log.entries(), vec!["m", "F"]);
    }

    #[test]
    fn test_short_circuit_skips_next() {
        let log = CallLog::new();
        let fallback = StaticHandler::new("F", log.clone(), "F");
        let next: Next<'_> = &fallback;

        assert_eq!(ShortCircuit::new("s", log.clone(), "S").process(1, next), Ok("S"));
        assert_eq!(log.entries(), vec!["s"]);
    }

    #[test]
    fn test_failing_returns_error() {
        let log = CallLog::new();
        let fallback = StaticHandler::new("F", log.clone(), "F");
        let next: Next<'_> = &fallback;

        assert_eq!(Failing::new("x", log.clone(), "bad").process(1, next), Err("bad"));
        assert_eq!(log.count("F"), 0);
    }

    #[test]
    fn test_replay_calls_next_twice() {
        let log = CallLog::new();
        let fallback = StaticHandler::new("F", log.clone(), "F");
        let next: Next<'_> = &fallback;

        assert_eq!(Replay::new("r", log.clone()).process(1, next), Ok("F"));
        assert_eq!(log.entries(), vec!["r", "F", "F"]);
    }
}
