//! Shared device handle
//!
//! `Bb60Device` expects one caller at a time. When a configuration thread
//! and a reader thread need the same device, wrap it in a `SharedDevice`:
//! every call takes the lock, so a read can never overlap a deactivate or
//! close.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::device::Bb60Device;
use crate::domain::{Bb60Error, Bb60Result};

#[derive(Clone)]
pub struct SharedDevice {
    inner: Arc<Mutex<Bb60Device>>,
}

impl SharedDevice {
    pub fn new(device: Bb60Device) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    pub fn lock(&self) -> Bb60Result<MutexGuard<'_, Bb60Device>> {
        self.inner.lock().map_err(|_| Bb60Error::StateCorrupted)
    }

    /// Lock the device and run `f` on it
    pub fn with_device<T>(
        &self,
        f: impl FnOnce(&mut Bb60Device) -> Bb60Result<T>,
    ) -> Bb60Result<T> {
        let mut guard = self.lock()?;
        f(&mut guard)
    }
}
