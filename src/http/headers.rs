//! # Colección de Headers
//! src/http/headers.rs
//!
//! Mapa nombre → valor para los headers de requests y responses.
//! Los nombres son case-sensitive y un `set` repetido sobrescribe el valor
//! anterior (last-write-wins). El orden de inserción no se conserva.

use std::collections::HashMap;

/// Headers HTTP (ej: {"Host": "localhost:4221"})
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    inner: HashMap<String, String>,
}

impl HeaderMap {
    /// Crea un mapa vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Establece un header, sobrescribiendo si ya existía
    pub fn set(&mut self, name: &str, value: &str) {
        self.inner.insert(name.to_string(), value.to_string());
    }

    /// Obtiene el valor de un header (comparación exacta del nombre)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(|s| s.as_str())
    }

    /// Elimina un header y retorna su valor
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner.remove(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Itera sobre los pares (nombre, valor) en orden arbitrario
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
