//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Este módulo implementa el parser de requests directamente sobre el stream
//! de la conexión.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /files/notas.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hola!
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: No se consume aquí. El resto del stream queda disponible
//!    para el handler, que decide cuánto leer según `Content-Length`.

use std::fmt;
use std::io::{self, BufRead, Read};
use std::net::SocketAddr;
use std::num::ParseIntError;

use super::HeaderMap;
use crate::error::{HttpError, HttpResult};

/// Largo máximo de la request line y de cada header (terminador incluido)
pub const MAX_LINE_LEN: u64 = 8 * 1024;

/// Métodos HTTP
///
/// Cualquier token es aceptado: el router no filtra por método y cada
/// handler decide qué hacer con los que no conoce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    /// Cualquier otro token (ej: "PATCH", "BREW")
    Other(String),
}

impl Method {
    /// Convierte un token de la request line en un método
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::Other(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
///
/// Pertenece exclusivamente al thread que atiende la conexión.
pub struct Request {
    /// Método HTTP (GET, POST, ...)
    method: Method,

    /// Path tal cual llegó en la request line (sin decodificar ni normalizar)
    path: String,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Headers HTTP
    headers: HeaderMap,

    /// Resto del stream, posicionado justo después de la línea vacía
    body: Box<dyn BufRead + Send>,

    /// Captures del router: [0] = match completo, [1..] = grupos
    params: Vec<String>,

    /// Dirección del cliente (solo para logging)
    peer_addr: Option<SocketAddr>,
}

impl Request {
    /// Parsea un request desde un stream
    ///
    /// Lee la request line y los headers; el body queda sin consumir.
    ///
    /// # Errores
    ///
    /// * `MalformedRequestLine` - la primera línea no tiene 3 tokens o supera `MAX_LINE_LEN`
    /// * `MalformedHeader` - una línea de header sin ':' o que supera `MAX_LINE_LEN`
    /// * `ConnectionRead` - fallo de I/O o EOF antes de un terminador
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use std::io::Cursor;
    /// use minihttp::http::Request;
    ///
    /// let raw = b"GET /echo/abc HTTP/1.1\r\nUser-Agent: curl\r\n\r\n".to_vec();
    /// let request = Request::parse(Cursor::new(raw)).unwrap();
    ///
    /// assert_eq!(request.path(), "/echo/abc");
    /// assert_eq!(request.header("User-Agent"), Some("curl"));
    /// ```
    pub fn parse<R>(mut reader: R) -> HttpResult<Self>
    where
        R: BufRead + Send + 'static,
    {
        // 1. Request line
        let line = read_line(&mut reader, HttpError::MalformedRequestLine)?;
        let line = String::from_utf8(line).map_err(|e| {
            HttpError::MalformedRequestLine(String::from_utf8_lossy(e.as_bytes()).into_owned())
        })?;
        let (method, path, version) = Self::parse_request_line(&line)?;

        // 2. Headers hasta la línea vacía
        let headers = Self::parse_headers(&mut reader)?;

        // 3. El body es el resto del stream
        Ok(Request {
            method,
            path,
            version,
            headers,
            body: Box::new(reader),
            params: Vec::new(),
            peer_addr: None,
        })
    }

    /// Formato: `GET /path HTTP/1.1`
    fn parse_request_line(line: &str) -> HttpResult<(Method, String, String)> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(HttpError::MalformedRequestLine(line.to_string()));
        }

        Ok((
            Method::from_token(parts[0]),
            parts[1].to_string(),
            parts[2].to_string(),
        ))
    }

    /// Cada header tiene formato: "Name: Value". Se divide solo en el primer ':'.
    fn parse_headers<R: BufRead>(reader: &mut R) -> HttpResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        loop {
            let raw = read_line(reader, HttpError::MalformedHeader)?;
            let line = String::from_utf8(raw).map_err(|e| {
                HttpError::MalformedHeader(String::from_utf8_lossy(e.as_bytes()).into_owned())
            })?;

            // La línea vacía marca el fin de los headers
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => headers.set(name.trim(), value.trim()),
                None => return Err(HttpError::MalformedHeader(line)),
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Obtiene un header específico (nombre exacto)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Stream del body, sin consumir
    pub fn body(&mut self) -> &mut dyn Read {
        &mut self.body
    }

    /// Captures de la ruta que hizo match
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Capture en la posición `index` (0 = match completo)
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(|s| s.as_str())
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// `Content-Length` declarado por el cliente, si existe
    pub fn content_length(&self) -> Option<Result<u64, ParseIntError>> {
        self.header("Content-Length").map(|value| value.parse())
    }

    /// Indica si el cliente acepta la codificación `name`
    ///
    /// Separa `Accept-Encoding` por comas y compara cada token exactamente.
    /// No interpreta q-values ni comodines.
    ///
    /// # Ejemplo
    /// ```
    /// use std::io::Cursor;
    /// use minihttp::http::Request;
    ///
    /// let raw = b"GET / HTTP/1.1\r\nAccept-Encoding: deflate, gzip\r\n\r\n".to_vec();
    /// let request = Request::parse(Cursor::new(raw)).unwrap();
    ///
    /// assert!(request.accepts_encoding("gzip"));
    /// assert!(!request.accepts_encoding("br"));
    /// ```
    pub fn accepts_encoding(&self, name: &str) -> bool {
        self.header("Accept-Encoding")
            .map(|value| value.split(',').any(|token| token.trim() == name))
            .unwrap_or(false)
    }

    pub(crate) fn set_params(&mut self, params: Vec<String>) {
        self.params = params;
    }

    pub(crate) fn set_peer_addr(&mut self, addr: Option<SocketAddr>) {
        self.peer_addr = addr;
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("peer_addr", &self.peer_addr)
            .finish_non_exhaustive()
    }
}

/// Lee una línea terminada en `\n` y quita el `\r\n` (o `\n`) final.
///
/// Un EOF antes del terminador es un error de lectura: el cliente cerró
/// la conexión a mitad del request.
fn read_line<R: BufRead>(
    reader: &mut R,
    too_long: fn(String) -> HttpError,
) -> HttpResult<Vec<u8>> {
    let mut line = Vec::new();
    reader
        .by_ref()
        .take(MAX_LINE_LEN)
        .read_until(b'\n', &mut line)
        .map_err(HttpError::ConnectionRead)?;

    if line.last() != Some(&b'\n') {
        if line.len() as u64 >= MAX_LINE_LEN {
            return Err(too_long(format!("line exceeds {} bytes", MAX_LINE_LEN)));
        }
        return Err(HttpError::ConnectionRead(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before end of line",
        )));
    }

    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn parse(raw: &[u8]) -> HttpResult<Request> {
        Request::parse(Cursor::new(raw.to_vec()))
    }

    #[test]
    fn test_parse_simple_get() {
        let request = parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.headers().is_empty());
        assert!(request.params().is_empty());
    }

    #[test]
    fn test_path_is_verbatim() {
        let request = parse(b"GET /files/../a%20b/./c HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/files/../a%20b/./c");
    }

    #[test]
    fn test_parse_with_headers() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:4221\r\nUser-Agent:   test/1.0  \r\n\r\n";
        let request = parse(raw).unwrap();

        assert_eq!(request.header("Host"), Some("localhost:4221"));
        assert_eq!(request.header("User-Agent"), Some("test/1.0"));
    }

    #[test]
    fn test_header_split_on_first_colon() {
        let request = parse(b"GET / HTTP/1.1\r\nX-Time: 12:30:00\r\n\r\n").unwrap();
        assert_eq!(request.header("X-Time"), Some("12:30:00"));
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let request = parse(b"GET / HTTP/1.1\r\nX-A: 1\r\nX-A: 2\r\n\r\n").unwrap();
        assert_eq!(request.header("X-A"), Some("2"));
    }

    #[test]
    fn test_lf_only_fallback() {
        let request = parse(b"GET /user-agent HTTP/1.1\nUser-Agent: lf\n\n").unwrap();

        assert_eq!(request.path(), "/user-agent");
        assert_eq!(request.header("User-Agent"), Some("lf"));
    }

    #[test]
    fn test_unknown_method_is_accepted() {
        let request = parse(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.method(), &Method::Other("BREW".to_string()));
        assert_eq!(request.method().as_str(), "BREW");
    }

    #[test]
    fn test_invalid_request_line() {
        let result = parse(b"GET\r\n\r\n"); // Falta path y version
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));

        let result = parse(b"GET / HTTP/1.1 extra\r\n\r\n");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));
    }

    #[test]
    fn test_invalid_header() {
        let result = parse(b"GET / HTTP/1.1\r\nSinDosPuntos\r\n\r\n");
        assert!(matches!(result, Err(HttpError::MalformedHeader(h)) if h == "SinDosPuntos"));
    }

    #[test]
    fn test_empty_request_is_read_error() {
        let result = parse(b"");
        assert!(matches!(result, Err(HttpError::ConnectionRead(_))));
    }

    #[test]
    fn test_truncated_headers_is_read_error() {
        let result = parse(b"GET / HTTP/1.1\r\nHost: x\r\n");
        assert!(matches!(result, Err(HttpError::ConnectionRead(_))));
    }

    #[test]
    fn test_body_is_left_unread() {
        let mut request = parse(b"POST /files/a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhola!resto").unwrap();

        assert_eq!(request.content_length().unwrap().unwrap(), 5);

        let mut body = Vec::new();
        request.body().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"hola!resto");
    }

    #[test]
    fn test_content_length_invalid() {
        let request = parse(b"POST / HTTP/1.1\r\nContent-Length: cinco\r\n\r\n").unwrap();
        assert!(request.content_length().unwrap().is_err());

        let request = parse(b"POST / HTTP/1.1\r\n\r\n").unwrap();
        assert!(request.content_length().is_none());
    }

    #[test]
    fn test_accepts_encoding() {
        let request = parse(b"GET / HTTP/1.1\r\nAccept-Encoding: invalid-1, gzip , br\r\n\r\n").unwrap();

        assert!(request.accepts_encoding("gzip"));
        assert!(request.accepts_encoding("br"));
        assert!(!request.accepts_encoding("deflate"));
    }

    #[test]
    fn test_accepts_encoding_is_exact() {
        let request = parse(b"GET / HTTP/1.1\r\nAccept-Encoding: gzip;q=1.0, *\r\n\r\n").unwrap();
        assert!(!request.accepts_encoding("gzip"));

        let request = parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert!(!request.accepts_encoding("gzip"));
    }

    #[test]
    fn test_request_line_too_long() {
        // Sin '\n' nunca: el parser corta al llegar al máximo
        let mut raw = b"GET /".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN as usize * 4));

        let result = parse(&raw);
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));
    }

    #[test]
    fn test_header_line_too_long() {
        let mut raw = b"GET / HTTP/1.1\r\nX-Largo: ".to_vec();
        raw.extend(std::iter::repeat(b'x').take(MAX_LINE_LEN as usize));
        raw.extend_from_slice(b"\r\n\r\n");

        let result = parse(&raw);
        assert!(matches!(result, Err(HttpError::MalformedHeader(_))));
    }

    #[test]
    fn test_header_line_at_limit_is_accepted() {
        let prefix = b"X-Borde: ";
        let value_len = MAX_LINE_LEN as usize - prefix.len() - 2;
        let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
        raw.extend_from_slice(prefix);
        raw.extend(std::iter::repeat(b'v').take(value_len));
        raw.extend_from_slice(b"\r\n\r\n");

        let request = parse(&raw).unwrap();
        assert_eq!(request.header("X-Borde").map(str::len), Some(value_len));
    }

    proptest! {
        #[test]
        fn prop_header_value_is_trimmed(value in "[a-zA-Z0-9/;=.-]{0,32}", pad in " {0,4}") {
            let raw = format!("GET / HTTP/1.1\r\nX-Prop:{pad}{value}{pad}\r\n\r\n");
            let request = parse(raw.as_bytes()).unwrap();
            prop_assert_eq!(request.header("X-Prop"), Some(value.as_str()));
        }
    }
}
