//! # Middleware de Compresión gzip
//! src/middleware/gzip.rs
//!
//! Si el request declara `Accept-Encoding: gzip`, el handler recibe un writer
//! que comprime al vuelo todo lo que se escribe en él. Si no, el handler se
//! llama sin cambios.
//!
//! Cuando se comprime:
//! - `Content-Encoding: gzip` y `Vary: Accept-Encoding` se fijan antes de que
//!   salga cualquier byte
//! - el `Content-Length` que ponga el handler se descarta (el tamaño
//!   comprimido no se conoce de antemano; el fin del body lo marca el cierre
//!   de la conexión)
//! - el stream gzip siempre se termina (trailer incluido), aunque el handler
//!   falle a mitad de camino

use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use super::Middleware;
use crate::error::HttpResult;
use crate::http::{Request, ResponseWriter, StatusCode};
use crate::router::Handler;

/// Nombre del encoding en `Accept-Encoding` / `Content-Encoding`
pub const GZIP: &str = "gzip";

#[derive(Debug, Clone, Copy)]
pub struct GzipMiddleware {
    level: Compression,
}

impl GzipMiddleware {
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Default for GzipMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for GzipMiddleware {
    fn wrap<'a>(&'a self, inner: Box<dyn Handler + 'a>) -> Box<dyn Handler + 'a> {
        Box::new(Gzipped {
            inner,
            level: self.level,
        })
    }
}

struct Gzipped<'a> {
    inner: Box<dyn Handler + 'a>,
    level: Compression,
}

impl Handler for Gzipped<'_> {
    fn handle(&self, w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
        if !req.accepts_encoding(GZIP) {
            return self.inner.handle(w, req);
        }

        let mut gz = GzipResponseWriter::new(w, self.level);
        let result = self.inner.handle(&mut gz, req);
        // Terminar el stream pase lo que pase; el error del handler tiene prioridad
        let finished = gz.finish();

        result?;
        finished?;
        Ok(())
    }
}

/// Writer que comprime con gzip y reenvía al writer original
pub struct GzipResponseWriter<'a> {
    encoder: GzEncoder<&'a mut dyn ResponseWriter>,
}

impl<'a> GzipResponseWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter, level: Compression) -> Self {
        inner.set_header("Content-Encoding", GZIP);
        inner.set_header("Vary", "Accept-Encoding");
        inner.remove_header("Content-Length");

        Self {
            encoder: GzEncoder::new(inner, level),
        }
    }
}

impl Write for GzipResponseWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

impl ResponseWriter for GzipResponseWriter<'_> {
    fn status(&self) -> StatusCode {
        self.encoder.get_ref().status()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.encoder.get_mut().set_status(status);
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.encoder.get_ref().header(name)
    }

    fn set_header(&mut self, name: &str, value: &str) {
        // El largo sin comprimir no sirve para enmarcar el body comprimido
        if name.eq_ignore_ascii_case("Content-Length") {
            return;
        }
        self.encoder.get_mut().set_header(name, value);
    }

    fn remove_header(&mut self, name: &str) {
        self.encoder.get_mut().remove_header(name);
    }

    fn headers_sent(&self) -> bool {
        self.encoder.get_ref().headers_sent()
    }

    /// Escribe el trailer gzip y finaliza el writer original. Idempotente.
    fn finish(&mut self) -> io::Result<()> {
        self.encoder.try_finish()?;
        self.encoder.get_mut().finish()
    }
}
