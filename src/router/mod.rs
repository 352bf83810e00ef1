//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea paths HTTP a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Middlewares → Handler → ResponseWriter
//! ```
//!
//! Cada ruta es una regex anclada al path completo. Las rutas se evalúan en
//! el orden en que se registraron y gana la primera que hace match (los
//! patrones pueden solaparse). Los grupos de captura quedan en
//! `Request::params()`: índice 0 = match completo, 1.. = grupos.
//!
//! La tabla se construye una sola vez antes de aceptar conexiones y después
//! solo se lee, así que se comparte entre threads sin locks.

use regex::Regex;

use crate::error::{HttpError, HttpResult};
use crate::http::{respond, Request, ResponseWriter, StatusCode};
use crate::middleware::{self, Middleware};

/// Algo que sabe atender un request
///
/// Se implementa automáticamente para funciones y closures con la firma
/// `fn(&mut dyn ResponseWriter, &mut Request) -> HttpResult`.
pub trait Handler: Send + Sync {
    fn handle(&self, w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult;
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, &mut Request) -> HttpResult + Send + Sync,
{
    fn handle(&self, w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
        self(w, req)
    }
}

/// Handler por defecto cuando ninguna ruta hace match
pub fn not_found_handler(w: &mut dyn ResponseWriter, _req: &mut Request) -> HttpResult {
    respond(w, StatusCode::NotFound, Some("text/plain"), b"Not Found")
}

/// Una ruta registrada: regex compilada + handler
struct Route {
    pattern: Regex,
    handler: Box<dyn Handler>,
}

/// Router que mapea paths a handlers
pub struct Router {
    /// Rutas en orden de registro
    routes: Vec<Route>,

    /// Middlewares en orden de registro (el último es el más externo)
    middleware: Vec<Box<dyn Middleware>>,

    /// Handler cuando no hay match
    not_found: Box<dyn Handler>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            middleware: Vec::new(),
            not_found: Box::new(not_found_handler),
        }
    }

    /// Registra una ruta con su handler
    ///
    /// El patrón se ancla al path completo y se compila una sola vez aquí.
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::router::Router;
    /// use minihttp::http::{respond, Request, ResponseWriter, StatusCode};
    /// use minihttp::error::HttpResult;
    ///
    /// fn hello_handler(w: &mut dyn ResponseWriter, _req: &mut Request) -> HttpResult {
    ///     respond(w, StatusCode::Ok, Some("text/plain"), b"hello")
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(r"/hello", hello_handler).unwrap();
    /// ```
    pub fn register<H>(&mut self, pattern: &str, handler: H) -> HttpResult<()>
    where
        H: Handler + 'static,
    {
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored).map_err(|source| HttpError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        self.routes.push(Route {
            pattern: regex,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Agrega un middleware al final de la cadena
    pub fn add_middleware<M>(&mut self, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.middleware.push(Box::new(middleware));
    }

    /// Reemplaza el handler de "no encontrado"
    pub fn set_not_found<H>(&mut self, handler: H)
    where
        H: Handler + 'static,
    {
        self.not_found = Box::new(handler);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Busca la primera ruta que hace match con `path`
    ///
    /// Retorna el handler y los captures (0 = match completo). Un grupo
    /// opcional que no participó en el match queda como string vacío.
    pub fn resolve(&self, path: &str) -> Option<(&dyn Handler, Vec<String>)> {
        self.routes.iter().find_map(|route| {
            route.pattern.captures(path).map(|caps| {
                let params = caps
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                (route.handler.as_ref(), params)
            })
        })
    }

    /// Encuentra el handler para el request, lo envuelve con los
    /// middlewares y lo ejecuta
    ///
    /// Si no hay ruta se usa el handler 404, que también pasa por los
    /// middlewares.
    pub fn dispatch(&self, w: &mut dyn ResponseWriter, req: &mut Request) -> HttpResult {
        let handler = match self.resolve(req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler
            }
            None => self.not_found.as_ref(),
        };

        let chain = middleware::compose(&self.middleware, handler);
        chain.handle(w, req)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
