//! # Límite de Conexiones
//! src/server/limiter.rs
//!
//! Contador de conexiones activas con un máximo opcional. Cuando se alcanza
//! el máximo, `acquire` bloquea el loop de accept hasta que algún worker
//! termine; las conexiones nuevas esperan en el backlog del kernel.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Semáforo de conexiones thread-safe
#[derive(Debug)]
pub struct ConnectionLimiter {
    /// Máximo de conexiones simultáneas (`None` = sin límite)
    max: Option<usize>,

    /// Conexiones activas
    active: Mutex<usize>,

    /// Condvar para notificar cuando se libera un lugar
    released: Condvar,
}

impl ConnectionLimiter {
    pub fn new(max: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            max,
            active: Mutex::new(0),
            released: Condvar::new(),
        })
    }

    /// Reserva un lugar, esperando si hace falta
    pub fn acquire(self: &Arc<Self>) -> ConnectionPermit {
        let guard = self.lock();
        let mut active = match self.max {
            Some(max) => self
                .released
                .wait_while(guard, |active| *active >= max)
                .unwrap_or_else(PoisonError::into_inner),
            None => guard,
        };
        *active += 1;

        ConnectionPermit {
            limiter: Arc::clone(self),
        }
    }

    /// Conexiones activas en este momento
    pub fn active(&self) -> usize {
        *self.lock()
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let mut active = self.lock();
        *active = active.saturating_sub(1);
        self.released.notify_one();
    }
}

/// Lugar reservado; se libera al hacer drop (cuando termina el worker)
#[derive(Debug)]
pub struct ConnectionPermit {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
