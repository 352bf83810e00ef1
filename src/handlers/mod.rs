//! # Handlers del Servidor
//!
//! Este módulo contiene los handlers de las rutas fijas del servidor.
//!
//! ## Categorías
//!
//! - **basic**: `/`, `/echo/{texto}`, `/user-agent`
//! - **files**: `/files/{nombre}` (GET y POST sobre el directorio servido)
//!
//! Cada handler recibe el writer y el request; los errores de dominio
//! (404/400/500) se responden aquí mismo.

pub mod basic;
pub mod files;

// Re-exportar funciones útiles
pub use basic::*;
pub use files::FilesHandler;
