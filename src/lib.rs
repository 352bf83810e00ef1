//! # minihttp
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo sobre TCP bloqueante: un thread por conexión,
//! una request por conexión, routing por regex y middlewares
//! (logging y gzip).
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: parsing del request y writer de la response
//! - `router`: tabla de rutas regex → handler
//! - `middleware`: envoltorios de handlers (logging, gzip)
//! - `handlers`: rutas fijas (`/`, `/echo`, `/user-agent`, `/files`)
//! - `server`: loop de accept y manejo de cada conexión
//! - `config`: argumentos CLI y variables de entorno
//! - `app`: arma el router con las rutas fijas
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use minihttp::app::build_router;
//! use minihttp::config::Config;
//! use minihttp::server::Server;
//!
//! let config = Config::default();
//! let router = build_router(&config.served_directory().unwrap(), true).unwrap();
//! Server::new(config, router).run().expect("Error al iniciar servidor");
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{HttpError, HttpResult};
