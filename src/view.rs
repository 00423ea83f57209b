//! Read-only snapshots of engine state for renderers.
//!
//! Views are plain value copies: they hold no references into the engine
//! and can be handed to other threads once taken.

use serde::Serialize;

use crate::cpu::Core;
use crate::process::{Process, ProcessState};
use crate::telemetry::CoreTelemetry;
use crate::types::{CoreId, Pid, Priority, Tick};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessView {
    pub pid: Pid,
    pub name: String,
    pub priority: Priority,
    pub burst_time: u32,
    pub remaining_time: u32,
    pub time_slice_remaining: u32,
    pub arrival_tick: Tick,
    pub state: ProcessState,
}

impl From<&Process> for ProcessView {
    fn from(p: &Process) -> Self {
        ProcessView {
            pid: p.pid(),
            name: p.name().to_string(),
            priority: p.priority(),
            burst_time: p.burst_time(),
            remaining_time: p.remaining_time(),
            time_slice_remaining: p.time_slice_remaining(),
            arrival_tick: p.arrival_tick(),
            state: p.state(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreView {
    pub id: CoreId,
    pub running: Option<ProcessView>,
    /// Present only when telemetry is enabled.
    pub telemetry: Option<CoreTelemetry>,
}

impl CoreView {
    pub(crate) fn new(core: &Core, with_telemetry: bool) -> Self {
        CoreView {
            id: core.id,
            running: core.running().map(ProcessView::from),
            telemetry: with_telemetry.then(|| core.telemetry()),
        }
    }
}

/// Cores and ready-queue contents at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateView {
    /// The next tick `step()` will execute.
    pub tick: Tick,
    pub cores: Vec<CoreView>,
    /// Ready queue in order, head first.
    pub ready: Vec<ProcessView>,
}

impl StateView {
    /// PIDs of running processes, in core order.
    pub fn running_pids(&self) -> Vec<Pid> {
        self.cores
            .iter()
            .filter_map(|c| c.running.as_ref().map(|p| p.pid))
            .collect()
    }

    /// PIDs in the ready queue, head first.
    pub fn ready_pids(&self) -> Vec<Pid> {
        self.ready.iter().map(|p| p.pid).collect()
    }

    /// Find a live process by PID.
    pub fn process(&self, pid: Pid) -> Option<&ProcessView> {
        self.cores
            .iter()
            .filter_map(|c| c.running.as_ref())
            .chain(self.ready.iter())
            .find(|p| p.pid == pid)
    }
}
