//! # Tabla de Rutas de la Aplicación
//! src/app.rs
//!
//! Rutas fijas del servidor, en orden de prioridad:
//!
//! | Patrón          | Handler              |
//! |-----------------|----------------------|
//! | `/echo/(.*)`    | `echo_handler`       |
//! | `/user-agent`   | `user_agent_handler` |
//! | `/files/(.*)`   | `FilesHandler`       |
//! | `/`             | `root_handler`       |
//!
//! Middlewares: logging y (si está activo) gzip. Gzip se registra último,
//! así que queda por fuera del logging.

use std::path::Path;

use crate::error::HttpResult;
use crate::handlers::{echo_handler, root_handler, user_agent_handler, FilesHandler};
use crate::middleware::{GzipMiddleware, LoggingMiddleware};
use crate::router::Router;

/// Construye el router con todas las rutas y middlewares
pub fn build_router(root: &Path, gzip: bool) -> HttpResult<Router> {
    let mut router = Router::new();

    router.register(r"/echo/(.*)", echo_handler)?;
    router.register(r"/user-agent", user_agent_handler)?;
    router.register(r"/files/(.*)", FilesHandler::new(root))?;
    router.register(r"/", root_handler)?;

    router.add_middleware(LoggingMiddleware::new());
    if gzip {
        router.add_middleware(GzipMiddleware::new());
    }

    Ok(router)
}
