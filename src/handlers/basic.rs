//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - `/`: 200 sin body
//! - `/echo/{texto}`: devuelve el texto capturado
//! - `/user-agent`: devuelve el header `User-Agent`

use crate::error::HttpResult;
use crate::http::{respond, Request, ResponseWriter, StatusCode};

/// Handler para /
pub fn root_handler(w: &mut dyn ResponseWriter, _req: &mut Request) -> HttpResult {
    respond(w, StatusCode::Ok, None, b"")
}

/// Handler para /echo/{texto}
///
/// El body es exactamente el grupo 1 de la ruta, sin decodificar.
pub fn echo_handler(w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
    let text = req.param(1).unwrap_or_default();
    respond(w, StatusCode::Ok, Some("text/plain"), text.as_bytes())
}

/// Handler para /user-agent
///
/// Sin header `User-Agent` responde 200 con body vacío.
pub fn user_agent_handler(w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
    let user_agent = req.header("User-Agent").unwrap_or_default();
    respond(w, StatusCode::Ok, Some("text/plain"), user_agent.as_bytes())
}
