//! HTTP-shaped middleware chain with structured logging.
//!
//! Run with `RELAY_LOG_LEVEL=trace cargo run -p relay --example chain` to see
//! every dispatch step.

use bytes::Bytes;
use http::{header, Request, Response, StatusCode};
use relay::prelude::*;

type HttpRequest = Request<Bytes>;
type HttpResponse = Response<Bytes>;
type HttpError = http::Error;
type HttpNext<'a> = &'a dyn RequestHandler<HttpRequest, HttpResponse, HttpError>;

fn respond(status: StatusCode, body: &'static str) -> Result<HttpResponse, HttpError> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Bytes::from_static(body.as_bytes()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::new()
        .with_development()
        .with_env_prefix("RELAY")
        .load()?;
    init_logging(&config)?;

    let not_found = FnHandler::new(|_req: HttpRequest| respond(StatusCode::NOT_FOUND, "not found"));

    let base = Dispatcher::new(not_found);

    let authenticated = base.with_middleware(FnMiddleware::new(
        "auth",
        |req: HttpRequest, next: HttpNext<'_>| {
            if req.headers().contains_key(header::AUTHORIZATION) {
                next.handle(req)
            } else {
                respond(StatusCode::UNAUTHORIZED, "missing credentials")
            }
        },
    ))?;

    let app = authenticated.with_middleware(FnMiddleware::new(
        "health",
        |req: HttpRequest, next: HttpNext<'_>| {
            if req.uri().path() == "/health" {
                respond(StatusCode::OK, "ok")
            } else {
                next.handle(req)
            }
        },
    ))?;

    tracing::info!(stages = ?app.middleware_names(), "dispatcher ready");

    for (path, token) in [("/health", Some("secret")), ("/health", None), ("/users", Some("secret"))] {
        let mut builder = Request::get(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        let response = app.handle(builder.body(Bytes::new())?)?;
        tracing::info!(path, status = response.status().as_u16(), "handled");
    }

    // The dispatcher has handled requests, so it can no longer grow.
    if let Err(err) = app.with_middleware(FnMiddleware::new("late", |req: HttpRequest, next: HttpNext<'_>| {
        next.handle(req)
    })) {
        tracing::info!(%err, "late registration rejected");
    }

    // A frozen copy of the earlier, still unlocked stage keeps working independently.
    let frozen = authenticated.freeze();
    let response = frozen.handle(Request::get("/health").body(Bytes::new())?)?;
    tracing::info!(status = response.status().as_u16(), stages = frozen.stage_count(), "frozen pipeline");

    Ok(())
}
