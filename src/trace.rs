//! Trace event recording for a simulation run.
//!
//! Every scheduling action (arrival, assignment, preemption, completion,
//! rejected arrival, core going idle) is recorded as a `TraceEvent` with
//! the tick it happened at and, where applicable, the core involved.

use serde::Serialize;

use crate::engine::StepEvent;
use crate::types::{CoreId, Pid, Tick};

/// A single trace event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEvent {
    pub tick: Tick,
    pub core: Option<CoreId>,
    pub kind: TraceKind,
}

/// The type of scheduling event recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TraceKind {
    /// A process entered the ready queue.
    Arrived { pid: Pid },
    /// An arrival was dropped because the ready queue was full.
    Rejected,
    /// A process started (or resumed) running on a core.
    Assigned { pid: Pid, time_slice: u32 },
    /// A process exhausted its slice and went back to the ready queue.
    Preempted { pid: Pid },
    /// A process finished its burst.
    Completed { pid: Pid },
    /// A core finished a step with nothing to run.
    CoreIdle,
}

impl From<&StepEvent> for TraceEvent {
    fn from(event: &StepEvent) -> Self {
        let kind = match *event {
            StepEvent::Completed { pid, .. } => TraceKind::Completed { pid },
            StepEvent::Preempted { pid, .. } => TraceKind::Preempted { pid },
            StepEvent::Assigned {
                pid, time_slice, ..
            } => TraceKind::Assigned { pid, time_slice },
        };
        TraceEvent {
            tick: event.tick(),
            core: Some(event.core()),
            kind,
        }
    }
}

/// A complete simulation trace, with events in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn record(&mut self, tick: Tick, core: Option<CoreId>, kind: TraceKind) {
        self.events.push(TraceEvent { tick, core, kind });
    }

    /// Append the events of one engine step.
    pub fn record_step(&mut self, events: &[StepEvent]) {
        self.events.extend(events.iter().map(TraceEvent::from));
    }

    /// Get all events in order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Total ticks a process spent running.
    ///
    /// Sums the intervals between each `Assigned` and the next
    /// `Preempted`/`Completed` for that PID.
    pub fn total_runtime(&self, pid: Pid) -> Tick {
        let mut total: Tick = 0;
        let mut running_since: Option<Tick> = None;

        for event in &self.events {
            match &event.kind {
                TraceKind::Assigned { pid: p, .. } if *p == pid => {
                    running_since = Some(event.tick);
                }
                TraceKind::Preempted { pid: p } | TraceKind::Completed { pid: p }
                    if *p == pid =>
                {
                    if let Some(start) = running_since.take() {
                        total += event.tick - start;
                    }
                }
                _ => {}
            }
        }

        total
    }

    /// Count the number of times a process was assigned to a core.
    pub fn schedule_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Assigned { pid: p, .. } if p == pid))
            .count()
    }

    /// Count the number of times a process was preempted.
    pub fn preempt_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Preempted { pid: p } if p == pid))
            .count()
    }

    /// Tick at which a process completed, if it did.
    pub fn completion_tick(&self, pid: Pid) -> Option<Tick> {
        self.events.iter().find_map(|e| match e.kind {
            TraceKind::Completed { pid: p } if p == pid => Some(e.tick),
            _ => None,
        })
    }

    /// Tick at which a process arrived, if recorded.
    pub fn arrival_tick(&self, pid: Pid) -> Option<Tick> {
        self.events.iter().find_map(|e| match e.kind {
            TraceKind::Arrived { pid: p } if p == pid => Some(e.tick),
            _ => None,
        })
    }

    /// PIDs in the order they were assigned, resumptions included.
    pub fn assignment_order(&self) -> Vec<Pid> {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Assigned { pid, .. } => Some(pid),
                _ => None,
            })
            .collect()
    }

    /// Count the number of steps a core ended idle.
    pub fn idle_count(&self, core: CoreId) -> usize {
        self.events
            .iter()
            .filter(|e| e.core == Some(core) && matches!(e.kind, TraceKind::CoreIdle))
            .count()
    }

    /// Pretty-print the trace for debugging.
    pub fn dump(&self) {
        for event in &self.events {
            let desc = match &event.kind {
                TraceKind::Arrived { pid } => format!("ARRIVE   pid={}", pid.0),
                TraceKind::Rejected => "REJECT".to_string(),
                TraceKind::Assigned { pid, time_slice } => {
                    format!("ASSIGN   pid={} slice={}", pid.0, time_slice)
                }
                TraceKind::Preempted { pid } => format!("PREEMPT  pid={}", pid.0),
                TraceKind::Completed { pid } => format!("COMPLETE pid={}", pid.0),
                TraceKind::CoreIdle => "IDLE".to_string(),
            };
            let core = event
                .core
                .map_or_else(|| "-".to_string(), |c| c.0.to_string());
            eprintln!("[t={:>8}] core={:<3} {}", event.tick, core, desc);
        }
    }
}
