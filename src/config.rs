//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./minihttp --port 4221 --directory /tmp/archivos \
//!   --max-connections 256 \
//!   --read-timeout-ms 30000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=4221 SERVE_DIRECTORY=/tmp/archivos ./minihttp
//! ```
//!
//! Por defecto no hay límite de conexiones ni timeouts: un cliente lento
//! ocupa un thread indefinidamente. Ambos límites son opcionales y se
//! activan con un valor distinto de 0.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "minihttp")]
#[command(about = "Servidor HTTP/1.1 mínimo con routing por regex y gzip")]
#[command(version)]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Directorio desde el que se sirven/guardan archivos
    #[arg(short, long, default_value = ".", env = "SERVE_DIRECTORY")]
    pub directory: PathBuf,

    // === Límites ===

    /// Máximo de conexiones atendidas a la vez (0 = sin límite)
    #[arg(long = "max-connections", default_value = "0", env = "MAX_CONNECTIONS")]
    pub max_connections: usize,

    /// Timeout de lectura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "0", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "write-timeout-ms", default_value = "0", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    // === Middlewares ===

    /// Desactiva la compresión gzip
    #[arg(long = "no-gzip", env = "DISABLE_GZIP")]
    pub no_gzip: bool,

    /// Filtro de logs cuando RUST_LOG no está definido
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use minihttp::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Ruta absoluta del directorio servido
    pub fn served_directory(&self) -> io::Result<PathBuf> {
        std::fs::canonicalize(&self.directory)
    }

    /// `None` = sin límite
    pub fn connection_limit(&self) -> Option<usize> {
        (self.max_connections > 0).then_some(self.max_connections)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    pub fn gzip_enabled(&self) -> bool {
        !self.no_gzip
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }
        if !self.directory.is_dir() {
            return Err(format!(
                "Directory is not a directory: {}",
                self.directory.display()
            ));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            directory = %self.directory.display(),
            max_connections = self.max_connections,
            read_timeout_ms = self.read_timeout_ms,
            write_timeout_ms = self.write_timeout_ms,
            gzip = self.gzip_enabled(),
            "configuration loaded"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4221,
            directory: PathBuf::from("."),
            max_connections: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            no_gzip: false,
            log_level: "info".to_string(),
        }
    }
}
