//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Flujo completo de una conexión:
//!
//! ```text
//! parse → router (+ middlewares) → handler → finish → close → drain
//! ```
//!
//! Una sola request por conexión. Si el parsing falla no se envía nada y la
//! conexión se cierra. Si el handler falla antes de enviar headers se
//! responde un 500 vacío; si ya los envió, solo se cierra.

use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::{HttpError, HttpResult};
use crate::http::{Request, Response, ResponseWriter, StatusCode};
use crate::router::Router;

/// Valor del header `Server` en todas las respuestas
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Máximo de bytes sobrantes del request que se descartan antes de cerrar
pub const DRAIN_LIMIT: u64 = 1024 * 1024;

/// Cuánto se espera a que el cliente termine de mandar lo que sobra
pub const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Atiende una conexión TCP de principio a fin
///
/// El stream se cierra siempre al retornar (ambos descriptores, el de
/// lectura y el de escritura, se liberan aquí).
pub fn handle_connection(stream: TcpStream, router: &Router) -> HttpResult {
    let peer = stream.peer_addr().ok();
    let reader = BufReader::new(stream.try_clone().map_err(HttpError::ConnectionRead)?);

    let mut request = Request::parse(reader)?;
    request.set_peer_addr(peer);

    let writer = stream.try_clone().map_err(HttpError::ConnectionWrite)?;
    let mut response = Response::new(BufWriter::new(writer));
    let result = serve(router, &mut response, &mut request);
    drop(response);

    drain(&stream, request.body());
    result
}

/// Cierra la mitad de escritura y descarta lo que quede del request
///
/// Si el socket se cierra con bytes sin leer en el buffer de recepción, el
/// kernel manda RST en vez de FIN y el cliente puede perder la respuesta.
/// El descarte tiene tope de bytes y de tiempo.
fn drain(stream: &TcpStream, body: &mut dyn Read) {
    if stream.shutdown(Shutdown::Write).is_err() {
        return;
    }
    if stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_err() {
        return;
    }
    let _ = io::copy(&mut Read::take(body, DRAIN_LIMIT), &mut io::sink());
}

/// Despacha un request ya parseado y finaliza/cierra el writer
///
/// Separado de `handle_connection` para poder probarlo sobre un `Vec<u8>`.
pub fn serve<W: Write>(
    router: &Router,
    response: &mut Response<W>,
    request: &mut Request,
) -> HttpResult {
    response.set_header("Connection", "close");
    response.set_header("Server", SERVER_NAME);

    let result = router.dispatch(response, request);

    let finalized = match &result {
        Ok(()) => response.finish(),
        Err(_) if !response.headers_sent() => {
            response.set_status(StatusCode::InternalServerError);
            response.remove_header("Content-Type");
            response.set_header("Content-Length", "0");
            response.finish()
        }
        // Headers ya enviados: el status no se puede corregir
        Err(_) => Ok(()),
    };
    let closed = response.close();

    result?;
    finalized?;
    closed?;
    Ok(())
}
