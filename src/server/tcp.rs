//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que maneja múltiples conexiones
//! simultáneas usando threads. Cada conexión se procesa en su propio thread
//! y se cierra después de una sola respuesta.
//!
//! Lo único compartido entre threads es la tabla de rutas (que incluye el
//! directorio servido), construida antes del primer accept y de solo lectura
//! después: basta con un `Arc`, sin locks.

use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use super::connection::handle_connection;
use super::limiter::{ConnectionLimiter, ConnectionPermit};
use crate::config::Config;
use crate::router::Router;

/// Servidor HTTP/1.1 concurrente
pub struct Server {
    config: Config,
    router: Arc<Router>,
    limiter: Arc<ConnectionLimiter>,
}

impl Server {
    pub fn new(config: Config, router: Router) -> Self {
        let limiter = ConnectionLimiter::new(config.connection_limit());
        Self {
            config,
            router: Arc::new(router),
            limiter,
        }
    }

    /// Abre el puerto configurado y atiende conexiones para siempre
    pub fn run(&self) -> io::Result<()> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address)?;
        self.serve(listener)
    }

    /// Loop de accept sobre un listener ya abierto
    ///
    /// Un error de accept se registra y el loop sigue.
    pub fn serve(&self, listener: TcpListener) -> io::Result<()> {
        info!(
            address = %listener.local_addr()?,
            max_connections = ?self.limiter.max(),
            "listening for connections (one thread per connection)"
        );

        loop {
            // Reservar el lugar antes del accept: con el límite alcanzado
            // las conexiones nuevas esperan en el backlog del kernel
            let permit = self.limiter.acquire();

            match listener.accept() {
                Ok((stream, _)) => self.spawn_worker(stream, permit),
                Err(e) => warn!(error = %e, "failed to accept connection"),
            }
        }
    }

    fn spawn_worker(&self, stream: TcpStream, permit: ConnectionPermit) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        if let Err(e) = self.apply_timeouts(&stream) {
            warn!(peer = %peer, error = %e, "failed to configure socket");
            return;
        }

        debug!(peer = %peer, active = self.limiter.active(), "new connection (spawning thread)");

        let router = Arc::clone(&self.router);
        let spawned = thread::Builder::new()
            .name("http-conn".to_string())
            .spawn(move || {
                let _permit = permit;
                match handle_connection(stream, &router) {
                    Ok(()) => debug!(peer = %peer, "connection closed"),
                    Err(e) if e.is_fatal_to_connection() => {
                        debug!(peer = %peer, error = %e, "connection dropped without response");
                    }
                    Err(e) => warn!(peer = %peer, error = %e, "connection failed"),
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn connection thread");
        }
    }

    fn apply_timeouts(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_read_timeout(self.config.read_timeout())?;
        stream.set_write_timeout(self.config.write_timeout())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpResult;
    use crate::http::{respond, Request, ResponseWriter, StatusCode};
    use std::io::{Read, Write};
    use std::net::SocketAddr;
    use std::time::Duration;

    fn hello_handler(w: &mut dyn ResponseWriter, _req: &mut Request) -> HttpResult {
        respond(w, StatusCode::Ok, Some("text/plain"), b"hola")
    }

    fn start(config: Config) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut router = Router::new();
        router.register(r"/hola", hello_handler).unwrap();
        let server = Server::new(config, router);

        thread::spawn(move || server.serve(listener));
        addr
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        write!(stream, "GET {} HTTP/1.1\r\nHost: test\r\n\r\n", path).unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_serves_sequential_requests() {
        let addr = start(Config::default());

        for _ in 0..5 {
            let response = get(addr, "/hola");
            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
            assert!(response.ends_with("hola"));
        }
        assert!(get(addr, "/otra").starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn test_slow_client_does_not_block_others() {
        let addr = start(Config::default());

        // Cliente que conecta y nunca termina los headers
        let mut slow = TcpStream::connect(addr).unwrap();
        slow.write_all(b"GET /hola HTTP/1.1\r\n").unwrap();

        let response = get(addr, "/hola");
        assert!(response.ends_with("hola"));
        drop(slow);
    }

    #[test]
    fn test_read_timeout_drops_stalled_client() {
        let mut config = Config::default();
        config.read_timeout_ms = 100;
        let addr = start(config);

        let mut stalled = TcpStream::connect(addr).unwrap();
        stalled.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        stalled.write_all(b"GET /hola HTTP/1.1\r\n").unwrap();

        // El servidor corta la conexión sin responder
        let mut buf = Vec::new();
        let _ = stalled.read_to_end(&mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_connection_limit_queues_extra_clients() {
        let mut config = Config::default();
        config.max_connections = 1;
        let addr = start(config);

        // Ocupa el único lugar
        let mut busy = TcpStream::connect(addr).unwrap();
        busy.write_all(b"GET /hola HTTP/1.1\r\n").unwrap();

        let waiting = thread::spawn(move || get(addr, "/hola"));
        thread::sleep(Duration::from_millis(100));
        assert!(!waiting.is_finished());

        // Al terminar el primero se atiende el segundo
        busy.write_all(b"\r\n").unwrap();
        let mut first = String::new();
        busy.read_to_string(&mut first).unwrap();
        assert!(first.ends_with("hola"));

        assert!(waiting.join().unwrap().ends_with("hola"));
    }
}
