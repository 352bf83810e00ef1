//! # Middleware de Logging
//! src/middleware/logging.rs
//!
//! Registra el request antes de llamar al handler y el status/latencia
//! después. No modifica ni el request ni el writer, y devuelve el resultado
//! del handler tal cual.

use std::time::Instant;

use tracing::{info, warn};

use super::Middleware;
use crate::error::HttpResult;
use crate::http::{Request, ResponseWriter};
use crate::router::Handler;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn wrap<'a>(&'a self, inner: Box<dyn Handler + 'a>) -> Box<dyn Handler + 'a> {
        Box::new(Logged { inner })
    }
}

struct Logged<'a> {
    inner: Box<dyn Handler + 'a>,
}

impl Handler for Logged<'_> {
    fn handle(&self, w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
        let start = Instant::now();
        let peer = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        info!(
            peer = %peer,
            method = %req.method(),
            path = req.path(),
            version = req.version(),
            "request"
        );

        let result = self.inner.handle(w, req);

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let status = w.status().as_u16();
        match &result {
            Ok(()) => info!(peer = %peer, status, elapsed_ms, "response"),
            Err(e) => warn!(peer = %peer, status, elapsed_ms, error = %e, "handler failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::http::{respond, Response, StatusCode};
    use std::io::{self, Cursor, Write};

    fn request() -> Request {
        Request::parse(Cursor::new(b"GET /echo/x HTTP/1.1\r\n\r\n".to_vec())).unwrap()
    }

    fn created_handler(w: &mut dyn ResponseWriter, _req: &mut Request) -> HttpResult {
        respond(w, StatusCode::Created, Some("text/plain"), b"hecho")
    }

    fn failing_handler(w: &mut dyn ResponseWriter, _req: &mut Request) -> HttpResult {
        w.write_all(b"parcial")?;
        Err(HttpError::ConnectionWrite(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "peer gone",
        )))
    }

    #[test]
    fn test_passes_response_through() {
        let logging = LoggingMiddleware::new();
        let chain = logging.wrap(Box::new(created_handler));

        let mut req = request();
        let mut response = Response::new(Vec::new());
        chain.handle(&mut response, &mut req).unwrap();

        let text = String::from_utf8(response.into_inner().unwrap()).unwrap();
        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.ends_with("hecho"));
    }

    #[test]
    fn test_does_not_mask_errors() {
        let logging = LoggingMiddleware::new();
        let chain = logging.wrap(Box::new(failing_handler));

        let mut req = request();
        let mut response = Response::new(Vec::new());
        let result = chain.handle(&mut response, &mut req);

        assert!(matches!(result, Err(HttpError::ConnectionWrite(_))));
        assert!(response.into_inner().unwrap().ends_with(b"parcial"));
    }
}
