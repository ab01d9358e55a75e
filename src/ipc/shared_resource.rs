use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::command::DriverCommand;
use crate::error::Result;
use crate::vehicle::{StepResult, VehicleController};

// Bounded diagnostic log shared between the tick loop and its observers
#[derive(Clone)]
pub struct DiagnosticLog {
    entries: Arc<RwLock<VecDeque<String>>>,
    max_size: usize,
}

impl DiagnosticLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    pub fn write(&self, message: String) {
        let mut log = self.entries.write();
        log.push_back(message);
        if log.len() > self.max_size {
            log.pop_front();
        }
    }

    pub fn read_all(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

// The controller behind a lock: every step and every command holds it, so a
// multi-threaded host can never interleave two mutations.
#[derive(Clone)]
pub struct SharedController {
    inner: Arc<Mutex<VehicleController>>,
}

impl SharedController {
    pub fn new(controller: VehicleController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn step(&self, dt: f64) -> Result<StepResult> {
        self.inner.lock().step(dt)
    }

    pub fn apply(&self, command: DriverCommand) {
        command.apply(&mut self.inner.lock());
    }

    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut VehicleController) -> R,
    {
        let mut controller = self.inner.lock();
        f(&mut controller)
    }

    pub fn snapshot(&self) -> VehicleController {
        self.inner.lock().clone()
    }
}
