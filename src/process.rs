//! Process model for the simulator.
//!
//! A process is owned by exactly one place at a time: the ready queue or a
//! core's running slot. Completed processes are dropped.

use rand::Rng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::types::{Pid, Priority, Tick};

/// The state a simulated process can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    /// Waiting in the ready queue.
    Ready,
    /// Occupying a core.
    Running,
    /// Finished its burst. Never observed inside the engine's collections.
    Completed,
}

/// Caller-supplied parameters for a new process. `None` fields are sampled
/// from the configured ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSpec {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub burst_time: Option<u32>,
}

impl ProcessSpec {
    pub fn new(priority: Priority, burst_time: u32) -> Self {
        ProcessSpec {
            name: None,
            priority: Some(priority),
            burst_time: Some(burst_time),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// A simulated process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pid: Pid,
    name: String,
    priority: Priority,
    burst_time: u32,
    pub(crate) remaining_time: u32,
    pub(crate) time_slice_remaining: u32,
    arrival_tick: Tick,
    pub(crate) state: ProcessState,
}

impl Process {
    /// Create a `Ready` process from explicit values.
    pub fn new(
        pid: Pid,
        name: String,
        priority: Priority,
        burst_time: u32,
        arrival_tick: Tick,
    ) -> Result<Self, ConfigError> {
        if burst_time == 0 {
            return Err(ConfigError::ZeroBurst);
        }
        Ok(Process {
            pid,
            name,
            priority,
            burst_time,
            remaining_time: burst_time,
            time_slice_remaining: 0,
            arrival_tick,
            state: ProcessState::Ready,
        })
    }

    /// Create a process from `spec`, sampling missing fields from `config`.
    ///
    /// Draw order is fixed (priority, then burst) so identical seeds give
    /// identical processes.
    pub fn sample<R: Rng>(
        pid: Pid,
        spec: ProcessSpec,
        config: &EngineConfig,
        rng: &mut R,
        arrival_tick: Tick,
    ) -> Result<Self, ConfigError> {
        let (lo, hi) = config.priority_range;
        let priority = match spec.priority {
            Some(p) if !config.priority_in_range(p) => {
                return Err(ConfigError::PriorityOutOfRange { priority: p, lo, hi });
            }
            Some(p) => p,
            None => rng.gen_range(lo..=hi),
        };
        let burst_time = match spec.burst_time {
            Some(b) => b,
            None => {
                let (min, max) = config.burst_range;
                rng.gen_range(min..=max)
            }
        };
        let name = spec.name.unwrap_or_else(|| format!("proc-{}", pid.0));
        Process::new(pid, name, priority, burst_time, arrival_tick)
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn burst_time(&self) -> u32 {
        self.burst_time
    }

    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    pub fn time_slice_remaining(&self) -> u32 {
        self.time_slice_remaining
    }

    pub fn arrival_tick(&self) -> Tick {
        self.arrival_tick
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Ticks spent waiting since arrival, as of `now`.
    pub fn waited(&self, now: Tick) -> Tick {
        now.saturating_sub(self.arrival_tick)
    }
}
