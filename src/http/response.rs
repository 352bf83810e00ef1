//! # Escritura de Respuestas HTTP
//! src/http/response.rs
//!
//! El `Response` es un sink de un solo uso conectado al socket. Funciona como
//! una máquina de estados:
//!
//! ```text
//! Fresh ──(primer byte / finish)──▶ HeadersSent ──(close)──▶ Closed
//!   └────────────────────(close)──────────────────────────────▲
//! ```
//!
//! - En `Fresh` se pueden cambiar status y headers libremente.
//! - El primer `write` con bytes (o `finish`) envía la status line y todos
//!   los headers de una sola vez. Desde ahí los headers son inmutables:
//!   cualquier cambio posterior se ignora en silencio.
//! - `close` libera la conexión; es idempotente y también se ejecuta en `Drop`.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```
//!
//! No hay chunked encoding: si el handler conoce el tamaño total del body
//! debe fijar `Content-Length` antes del primer `write`. Si no, el cliente
//! detecta el fin del body cuando se cierra la conexión.

use std::io::{self, Write};

use super::{HeaderMap, StatusCode};
use crate::error::HttpResult;

/// Estados del writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Aún no se envió nada
    Fresh,
    /// Status line y headers ya están en el socket
    HeadersSent,
    /// Conexión liberada
    Closed,
}

/// Interfaz que reciben los handlers para construir la respuesta
///
/// Los middlewares pueden sustituirla por un writer propio (ej: gzip)
/// que envuelve al original.
pub trait ResponseWriter: Write {
    /// Status actual (200 si nadie lo cambió)
    fn status(&self) -> StatusCode;

    /// Cambia el status. No-op después del flush de headers.
    fn set_status(&mut self, status: StatusCode);

    fn header(&self, name: &str) -> Option<&str>;

    /// Establece un header. No-op después del flush de headers.
    fn set_header(&mut self, name: &str, value: &str);

    /// Elimina un header. No-op después del flush de headers.
    fn remove_header(&mut self, name: &str);

    fn headers_sent(&self) -> bool;

    /// Fuerza el envío de status y headers si todavía no se enviaron
    /// (ej: un 404 sin body) y vacía los buffers.
    fn finish(&mut self) -> io::Result<()>;
}

/// Writer concreto sobre cualquier `Write` (el socket en producción,
/// un `Vec<u8>` en los tests)
#[derive(Debug)]
pub struct Response<W: Write> {
    status: StatusCode,
    headers: HeaderMap,
    state: WriterState,
    sink: Option<W>,
}

impl<W: Write> Response<W> {
    /// Crea un writer en estado `Fresh`, con status 200 y sin headers
    pub fn new(sink: W) -> Self {
        Self {
            status: StatusCode::Ok,
            headers: HeaderMap::new(),
            state: WriterState::Fresh,
            sink: Some(sink),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Libera la conexión (vacía el buffer y suelta el sink).
    ///
    /// Idempotente. Si los headers nunca se enviaron, no se escribe nada:
    /// el cliente solo ve el cierre.
    pub fn close(&mut self) -> io::Result<()> {
        self.state = WriterState::Closed;
        match self.sink.take() {
            Some(mut sink) => sink.flush(),
            None => Ok(()),
        }
    }

    /// Extrae el sink sin cerrarlo. Usado en los tests para leer los bytes.
    pub fn into_inner(mut self) -> Option<W> {
        self.state = WriterState::Closed;
        self.sink.take()
    }

    fn sink_mut(&mut self) -> io::Result<&mut W> {
        self.sink.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "response writer is closed")
        })
    }

    /// Envía status line + headers y pasa a `HeadersSent`
    fn write_head(&mut self) -> io::Result<()> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);
        for (name, value) in self.headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        // Línea vacía que separa headers del body
        head.push_str("\r\n");

        self.sink_mut()?.write_all(head.as_bytes())?;
        self.state = WriterState::HeadersSent;
        Ok(())
    }
}

impl<W: Write> Write for Response<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.state {
            WriterState::Closed => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "response writer is closed",
            )),
            // Un write vacío no cuenta como "primer byte"
            WriterState::Fresh if buf.is_empty() => Ok(0),
            WriterState::Fresh => {
                self.write_head()?;
                self.sink_mut()?.write(buf)
            }
            WriterState::HeadersSent => self.sink_mut()?.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> ResponseWriter for Response<W> {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn set_status(&mut self, status: StatusCode) {
        if self.state == WriterState::Fresh {
            self.status = status;
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    fn set_header(&mut self, name: &str, value: &str) {
        if self.state == WriterState::Fresh {
            self.headers.set(name, value);
        }
    }

    fn remove_header(&mut self, name: &str) {
        if self.state == WriterState::Fresh {
            self.headers.remove(name);
        }
    }

    fn headers_sent(&self) -> bool {
        self.state != WriterState::Fresh
    }

    fn finish(&mut self) -> io::Result<()> {
        match self.state {
            WriterState::Fresh => {
                self.write_head()?;
                self.flush()
            }
            WriterState::HeadersSent => self.flush(),
            WriterState::Closed => Ok(()),
        }
    }
}

impl<W: Write> Drop for Response<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Respuesta completa en un solo paso: status, `Content-Type` (si se indica),
/// `Content-Length`, body y finalización.
///
/// # Ejemplo
/// ```
/// use minihttp::http::{respond, Response, StatusCode};
///
/// let mut response = Response::new(Vec::new());
/// respond(&mut response, StatusCode::Ok, Some("text/plain"), b"abc").unwrap();
///
/// let bytes = response.into_inner().unwrap();
/// let text = String::from_utf8(bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.ends_with("\r\n\r\nabc"));
/// ```
pub fn respond(
    w: &mut dyn ResponseWriter,
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> HttpResult {
    w.set_status(status);
    if let Some(content_type) = content_type {
        w.set_header("Content-Type", content_type);
    }
    w.set_header("Content-Length", &body.len().to_string());
    w.write_all(body)?;
    w.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(response: Response<Vec<u8>>) -> String {
        String::from_utf8(response.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_new_response() {
        let response = Response::new(Vec::new());
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.state(), WriterState::Fresh);
        assert!(response.headers().is_empty());
        assert!(!response.headers_sent());
    }

    #[test]
    fn test_first_write_flushes_head() {
        let mut response = Response::new(Vec::new());
        response.set_status(StatusCode::Created);
        response.set_header("Content-Type", "text/plain");
        response.write_all(b"Test").unwrap();

        assert_eq!(response.state(), WriterState::HeadersSent);

        let text = output(response);
        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_mutation_after_flush_is_ignored() {
        let mut response = Response::new(Vec::new());
        response.write_all(b"a").unwrap();

        response.set_status(StatusCode::NotFound);
        response.set_header("X-Late", "si");
        response.write_all(b"b").unwrap();

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("X-Late"), None);

        let text = output(response);
        assert_eq!(text, "HTTP/1.1 200 OK\r\n\r\nab");
    }

    #[test]
    fn test_finish_without_body() {
        let mut response = Response::new(Vec::new());
        response.set_status(StatusCode::NotFound);
        response.finish().unwrap();

        assert!(response.headers_sent());
        assert_eq!(output(response), "HTTP/1.1 404 Not Found\r\n\r\n");
    }

    #[test]
    fn test_finish_defaults_to_200() {
        let mut response = Response::new(Vec::new());
        response.finish().unwrap();
        // Un segundo finish no vuelve a escribir la cabecera
        response.finish().unwrap();

        assert_eq!(output(response), "HTTP/1.1 200 OK\r\n\r\n");
    }

    #[test]
    fn test_empty_write_does_not_flush() {
        let mut response = Response::new(Vec::new());
        assert_eq!(response.write(b"").unwrap(), 0);
        assert_eq!(response.state(), WriterState::Fresh);

        response.set_status(StatusCode::Created);
        response.finish().unwrap();
        assert!(output(response).starts_with("HTTP/1.1 201 Created\r\n"));
    }

    #[test]
    fn test_remove_header() {
        let mut response = Response::new(Vec::new());
        response.set_header("Content-Length", "10");
        response.remove_header("Content-Length");
        response.finish().unwrap();

        assert!(!output(response).contains("Content-Length"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut response = Response::new(Vec::new());
        response.close().unwrap();
        response.close().unwrap();

        assert_eq!(response.state(), WriterState::Closed);
        assert!(response.finish().is_ok());

        let err = response.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_respond_sets_length() {
        let mut response = Response::new(Vec::new());
        respond(&mut response, StatusCode::Ok, Some("text/plain"), b"Hello World").unwrap();

        let text = output(response);
        assert!(text.contains("Content-Length: 11\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.ends_with("\r\n\r\nHello World"));
    }

    #[test]
    fn test_respond_binary_body() {
        let binary = [0x00, 0x01, 0x02, 0xFF];
        let mut response = Response::new(Vec::new());
        respond(&mut response, StatusCode::Ok, None, &binary).unwrap();

        let bytes = response.into_inner().unwrap();
        assert!(bytes.ends_with(&binary));
        assert!(!String::from_utf8_lossy(&bytes).contains("Content-Type"));
    }
}
