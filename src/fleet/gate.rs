//! Bounded admission gate
//!
//! A counting semaphore with a name. A slot is held by a [`GatePermit`] and
//! handed back when the permit is dropped, on every exit path including
//! unwinding, so a finished or failed workflow can never leak a slot.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// The gate was closed while a task waited for a slot.
#[derive(Error, Debug)]
#[error("admission gate '{0}' is closed")]
pub struct GateClosed(pub &'static str);

/// Capacity-N admission primitive shared by every task that must pass it.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    name: &'static str,
    capacity: usize,
    slots: Arc<Semaphore>,
}

/// A held slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Create a gate admitting at most `capacity` holders at once.
    ///
    /// A zero capacity is raised to one so the gate can always make progress.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            slots: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Wait until a slot is free and take it.
    pub async fn acquire(&self) -> Result<GatePermit, GateClosed> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| GateClosed(self.name))?;
        Ok(GatePermit { _permit: permit })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    pub fn in_use(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }
}
