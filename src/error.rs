//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores de una conexión. Los errores de parsing y de lectura
//! son fatales: la conexión se cierra sin enviar respuesta. Los errores de
//! dominio (archivo no encontrado, tamaño inválido, fallo del filesystem) se
//! resuelven localmente en cada handler como respuestas 404/400/500 y nunca
//! llegan hasta aquí.

use std::io;

use thiserror::Error;

/// Errores que pueden ocurrir al atender una conexión
#[derive(Debug, Error)]
pub enum HttpError {
    /// La request line no tiene exactamente 3 tokens (o no es UTF-8)
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// Una línea de header sin ':'
    #[error("malformed header: {0:?}")]
    MalformedHeader(String),

    /// Fallo de I/O o stream cerrado antes del terminador de línea
    #[error("connection read failed: {0}")]
    ConnectionRead(#[source] io::Error),

    /// Fallo escribiendo la respuesta en el socket
    #[error("connection write failed: {0}")]
    ConnectionWrite(#[from] io::Error),

    /// Patrón de ruta que no compila como regex
    #[error("invalid route pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl HttpError {
    /// Errores tras los cuales no se intenta ninguna respuesta
    pub fn is_fatal_to_connection(&self) -> bool {
        matches!(
            self,
            HttpError::MalformedRequestLine(_)
                | HttpError::MalformedHeader(_)
                | HttpError::ConnectionRead(_)
        )
    }
}

/// Resultado de los handlers y del dispatch
pub type HttpResult<T = ()> = Result<T, HttpError>;
