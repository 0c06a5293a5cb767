//! Handler fixtures.

use crate::log::CallLog;
use parking_lot::Mutex;
use relay_core::RequestHandler;
use std::sync::Arc;

/// Records its name and returns a canned response.
#[derive(Debug, Clone)]
pub struct StaticHandler<Res> {
    name: &'static str,
    log: CallLog,
    response: Res,
}

impl<Res> StaticHandler<Res> {
    /// Creates a handler that always answers with `response`.
    #[must_use]
    pub fn new(name: &'static str, log: CallLog, response: Res) -> Self {
        Self {
            name,
            log,
            response,
        }
    }
}

impl<Req, Res, E> RequestHandler<Req, Res, E> for StaticHandler<Res>
where
    Res: Clone + Send + Sync,
{
    fn handle(&self, _request: Req) -> Result<Res, E> {
        self.log.record(self.name);
        Ok(self.response.clone())
    }
}

/// Records its name, keeps every request it receives and answers with it.
#[derive(Debug)]
pub struct EchoHandler<Req> {
    name: &'static str,
    log: CallLog,
    received: Arc<Mutex<Vec<Req>>>,
}

impl<Req: Clone> EchoHandler<Req> {
    /// Creates an echoing handler.
    #[must_use]
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            log,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns every request received so far, in order.
    #[must_use]
    pub fn received(&self) -> Vec<Req> {
        self.received.lock().clone()
    }
}

impl<Req> Clone for EchoHandler<Req> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            log: self.log.clone(),
            received: Arc::clone(&self.received),
        }
    }
}

impl<Req, E> RequestHandler<Req, Req, E> for EchoHandler<Req>
where
    Req: Clone + Send,
{
    fn handle(&self, request: Req) -> Result<Req, E> {
        self.log.record(self.name);
        self.received.lock().push(request.clone());
        Ok(request)
    }
}

/// Records its name and fails with a canned error.
#[derive(Debug, Clone)]
pub struct FailingHandler<E> {
    name: &'static str,
    log: CallLog,
    error: E,
}

impl<E> FailingHandler<E> {
    /// Creates a handler that always fails with `error`.
    #[must_use]
    pub fn new(name: &'static str, log: CallLog, error: E) -> Self {
        Self { name, log, error }
    }
}

impl<Req, Res, E> RequestHandler<Req, Res, E> for FailingHandler<E>
where
    E: Clone + Send + Sync,
{
    fn handle(&self, _request: Req) -> Result<Res, E> {
        self.log.record(self.name);
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_handler() {
        let log = CallLog::new();
        let handler = StaticHandler::new("ok", log.clone(), 200_u16);

        let response: Result<u16, ()> = handler.handle("req");
        assert_eq!(response, Ok(200));
        assert_eq!(log.entries(), vec!["ok"]);
    }

    #[test]
    fn test_echo_handler_keeps_requests() {
        let log = CallLog::new();
        let handler = EchoHandler::new("echo", log.clone());

        let first: Result<String, ()> = handler.handle("a".to_string());
        let second: Result<String, ()> = handler.handle("b".to_string());

        assert_eq!(first, Ok("a".to_string()));
        assert_eq!(second, Ok("b".to_string()));
        assert_eq!(handler.received(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(log.count("echo"), 2);
    }

    #[test]
    fn test_failing_handler() {
        let log = CallLog::new();
        let handler = FailingHandler::new("down", log.clone(), "unavailable");

        let response: Result<(), &str> = handler.handle(1_u32);
        assert_eq!(response, Err("unavailable"));
    }
}
