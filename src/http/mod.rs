//! # Módulo HTTP
//!
//! Este módulo implementa el protocolo HTTP/1.1 desde cero, sin usar
//! librerías de alto nivel. Incluye:
//!
//! - Colección de headers
//! - Parsing de requests directamente desde el socket
//! - Writer de respuestas con máquina de estados (headers → body → cierre)
//! - Códigos de estado
//!
//! ## Alcance
//!
//! - Una sola request por conexión (sin keep-alive ni pipelining)
//! - Sin chunked transfer encoding
//! - Sin TLS
//!
//! ### Formato de Request
//!
//! ```text
//! GET /echo/abc HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```

pub mod headers;   // Colección de headers
pub mod request;   // Parsing de HTTP requests
pub mod response;  // Writer de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use headers::HeaderMap;
pub use request::{Method, Request};
pub use response::{respond, Response, ResponseWriter, WriterState};
pub use status::StatusCode;
