//! # Handlers de Archivos
//! src/handlers/files.rs
//!
//! Sirve y recibe archivos dentro del directorio configurado.
//!
//! - `GET /files/{nombre}`: 200 con el contenido (`application/octet-stream`)
//! - `POST /files/{nombre}`: guarda el body y responde 201
//!
//! ## Errores
//!
//! | Caso                                   | Status |
//! |----------------------------------------|--------|
//! | nombre absoluto o con `..`             | 400    |
//! | archivo inexistente (GET)              | 404    |
//! | `Content-Length` ausente/inválido      | 400    |
//! | fallo al abrir/crear/copiar            | 500    |
//! | body más corto que `Content-Length`    | 500    |

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::HttpResult;
use crate::http::{respond, Method, Request, ResponseWriter, StatusCode};
use crate::router::{not_found_handler, Handler};

/// Handler para /files/{nombre}; despacha por método
#[derive(Debug, Clone)]
pub struct FilesHandler {
    /// Directorio servido (absoluto)
    root: PathBuf,
}

impl FilesHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Une `name` al directorio servido
    ///
    /// Solo se aceptan componentes normales: nada de rutas absolutas, `..`
    /// ni `.` inicial. Así un nombre nunca puede salir del directorio.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let mut components = relative.components().peekable();

        components.peek()?;
        if components.all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(relative))
        } else {
            None
        }
    }

    fn get_file(&self, w: &mut dyn ResponseWriter, name: &str) -> HttpResult {
        let Some(path) = self.resolve(name) else {
            return plain_status(w, StatusCode::BadRequest);
        };

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return plain_status(w, StatusCode::NotFound);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open file");
                return plain_status(w, StatusCode::InternalServerError);
            }
        };

        let size = match file.metadata() {
            Ok(metadata) if metadata.is_dir() => {
                return plain_status(w, StatusCode::NotFound);
            }
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to stat file");
                return plain_status(w, StatusCode::InternalServerError);
            }
        };

        w.set_status(StatusCode::Ok);
        w.set_header("Content-Type", "application/octet-stream");
        w.set_header("Content-Length", &size.to_string());
        io::copy(&mut file, &mut *w)?;
        w.finish()?;
        Ok(())
    }

    fn post_file(&self, w: &mut dyn ResponseWriter, req: &mut Request, name: &str) -> HttpResult {
        let Some(path) = self.resolve(name) else {
            return plain_status(w, StatusCode::BadRequest);
        };

        // Validar el tamaño antes de tocar el filesystem
        let length = match req.content_length() {
            Some(Ok(length)) => length,
            _ => return plain_status(w, StatusCode::BadRequest),
        };

        let mut file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to create file");
                return plain_status(w, StatusCode::InternalServerError);
            }
        };

        let copied = io::copy(&mut Read::take(req.body(), length), &mut file);
        drop(file);

        match copied {
            Ok(n) if n == length => {}
            Ok(n) => {
                warn!(path = %path.display(), expected = length, received = n, "upload body truncated");
                discard_partial(&path);
                return plain_status(w, StatusCode::InternalServerError);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "upload copy failed");
                discard_partial(&path);
                return plain_status(w, StatusCode::InternalServerError);
            }
        }

        w.set_header("Location", &format!("/files/{}", name));
        respond(w, StatusCode::Created, None, b"")
    }
}

impl Handler for FilesHandler {
    fn handle(&self, w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
        let name = req.param(1).unwrap_or_default().to_string();

        match req.method() {
            Method::GET => self.get_file(w, &name),
            Method::POST => self.post_file(w, req, &name),
            _ => not_found_handler(w, req),
        }
    }
}

/// Respuesta de error con el reason phrase como body
fn plain_status(w: &mut dyn ResponseWriter, status: StatusCode) -> HttpResult {
    respond(w, status, Some("text/plain"), status.reason_phrase().as_bytes())
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to remove partial upload");
    }
}
