//! # Middlewares
//! src/middleware/mod.rs
//!
//! Un middleware transforma un handler en otro handler que recibe el mismo
//! par (writer, request). La cadena se arma en cada dispatch, alrededor del
//! handler que eligió el router:
//!
//! ```text
//! registrados: [A, B]
//! cadena:      B( A( handler ) )
//! ```
//!
//! El último middleware registrado queda como el envoltorio más externo: es
//! el primero en ver el request y el último en ver los bytes que salen.
//!
//! - `logging`: registra cada request y su resultado
//! - `gzip`: comprime el body si el cliente acepta gzip

pub mod gzip;
pub mod logging;

pub use gzip::{GzipMiddleware, GzipResponseWriter};
pub use logging::LoggingMiddleware;

use crate::error::HttpResult;
use crate::http::{Request, ResponseWriter};
use crate::router::Handler;

/// Transformación `handler → handler`
pub trait Middleware: Send + Sync {
    fn wrap<'a>(&'a self, inner: Box<dyn Handler + 'a>) -> Box<dyn Handler + 'a>;
}

/// Adapta el handler prestado por el router para el fondo de la cadena
struct Endpoint<'a>(&'a dyn Handler);

impl Handler for Endpoint<'_> {
    fn handle(&self, w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
        self.0.handle(w, req)
    }
}

/// Envuelve `handler` con cada middleware en orden de registro
pub fn compose<'a>(
    middleware: &'a [Box<dyn Middleware>],
    handler: &'a dyn Handler,
) -> Box<dyn Handler + 'a> {
    let endpoint: Box<dyn Handler + 'a> = Box::new(Endpoint(handler));
    middleware
        .iter()
        .fold(endpoint, |inner, layer| layer.wrap(inner))
}
