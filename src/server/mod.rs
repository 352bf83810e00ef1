//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Parsea un único request por conexión
//! 4. Lo despacha por el router y cierra la conexión
//!
//! - `tcp`: loop de accept y threads de conexión
//! - `connection`: ciclo de vida de una conexión
//! - `limiter`: máximo opcional de conexiones simultáneas

pub mod connection;
pub mod limiter;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{handle_connection, SERVER_NAME};
pub use limiter::{ConnectionLimiter, ConnectionPermit};
pub use tcp::Server;
