//! Metrics derived from engine state.
//!
//! [`MetricsSnapshot::from_state`] is a pure function of the state: calling
//! it repeatedly between steps returns identical values.

use serde::Serialize;

use crate::engine::SchedulerState;
use crate::types::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Ticks executed so far.
    pub tick: Tick,
    /// Assignments performed, resumptions included.
    pub context_switches: u64,
    pub completed_count: u64,
    pub preemption_count: u64,
    /// Busy cores divided by total cores, in `[0, 1]`.
    pub cpu_utilization: f64,
    /// Mean `current_tick - arrival_tick` over the ready queue. Zero when empty.
    pub average_ready_wait: f64,
    /// Context switches per elapsed tick. Zero before the first tick.
    pub throughput: f64,
    pub ready_len: usize,
    /// Number of busy cores.
    pub running: usize,
}

impl MetricsSnapshot {
    pub fn from_state(state: &SchedulerState) -> Self {
        let now = state.current_tick();
        let cores = state.cores();
        let running = cores.iter().filter(|c| !c.is_idle()).count();
        let cpu_utilization = if cores.is_empty() {
            0.0
        } else {
            running as f64 / cores.len() as f64
        };

        let ready = state.ready_queue();
        let average_ready_wait = if ready.is_empty() {
            0.0
        } else {
            let total: u64 = ready.iter().map(|p| p.waited(now)).sum();
            total as f64 / ready.len() as f64
        };

        let throughput = if now == 0 {
            0.0
        } else {
            state.context_switch_count() as f64 / now as f64
        };

        MetricsSnapshot {
            tick: now,
            context_switches: state.context_switch_count(),
            completed_count: state.completed_count(),
            preemption_count: state.preemption_count(),
            cpu_utilization,
            average_ready_wait,
            throughput,
            ready_len: ready.len(),
            running,
        }
    }
}
