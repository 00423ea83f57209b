//! Simulated core state.

use crate::process::Process;
use crate::telemetry::CoreTelemetry;
use crate::types::{CoreId, Pid};

/// A simulated core.
#[derive(Debug, Clone)]
pub struct Core {
    /// Core ID.
    pub id: CoreId,
    /// The process currently occupying this core, or None if idle.
    pub(crate) running: Option<Process>,
    /// Ticks this core spent executing a process.
    pub(crate) busy_ticks: u64,
    /// Cosmetic load/temperature readings. Never read by the scheduler.
    pub(crate) telemetry: CoreTelemetry,
}

impl Core {
    pub fn new(id: CoreId) -> Self {
        Core {
            id,
            running: None,
            busy_ticks: 0,
            telemetry: CoreTelemetry::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    pub fn running(&self) -> Option<&Process> {
        self.running.as_ref()
    }

    pub fn running_pid(&self) -> Option<Pid> {
        self.running.as_ref().map(Process::pid)
    }

    pub fn busy_ticks(&self) -> u64 {
        self.busy_ticks
    }

    pub fn telemetry(&self) -> CoreTelemetry {
        self.telemetry
    }
}
