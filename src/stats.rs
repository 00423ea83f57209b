//! Per-process and per-core statistics derived from a trace.
//!
//! # Metrics Computed
//!
//! - **Run intervals**: ticks between each assignment and the following
//!   preemption or completion
//! - **Turnaround**: completion tick minus arrival tick
//! - **Waiting**: turnaround minus time spent running
//! - **Response**: first assignment tick minus arrival tick

use std::collections::HashMap;

use crate::trace::{Trace, TraceKind};
use crate::types::{CoreId, Pid, Tick};

/// Summary statistics for a distribution of values.
#[derive(Debug, Clone, Default)]
pub struct DistributionStats {
    pub count: usize,
    /// Minimum value (or 0 if empty).
    pub min: Tick,
    /// Maximum value (or 0 if empty).
    pub max: Tick,
    pub sum: Tick,
    sum_sq: u128,
}

impl DistributionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: Tick) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        self.sum_sq += (value as u128) * (value as u128);
    }

    /// Mean value (or 0 if empty).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    /// Standard deviation (or 0 if empty or single sample).
    pub fn stddev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            let mean = self.mean();
            let variance = (self.sum_sq as f64 / self.count as f64) - (mean * mean);
            variance.max(0.0).sqrt()
        }
    }
}

/// Per-process statistics computed from a trace.
#[derive(Debug, Clone, Default)]
pub struct ProcessStats {
    pub pid: Pid,
    pub arrival: Option<Tick>,
    pub first_assigned: Option<Tick>,
    pub completion: Option<Tick>,
    pub schedule_count: usize,
    pub preempt_count: usize,
    /// Length of each uninterrupted stretch on a core.
    pub run_intervals: DistributionStats,
}

impl ProcessStats {
    /// Ticks spent running.
    pub fn runtime(&self) -> Tick {
        self.run_intervals.sum
    }

    pub fn turnaround(&self) -> Option<Tick> {
        Some(self.completion?.saturating_sub(self.arrival?))
    }

    pub fn waiting(&self) -> Option<Tick> {
        Some(self.turnaround()?.saturating_sub(self.runtime()))
    }

    pub fn response(&self) -> Option<Tick> {
        Some(self.first_assigned?.saturating_sub(self.arrival?))
    }
}

/// Per-core statistics computed from a trace.
#[derive(Debug, Clone, Default)]
pub struct CoreStats {
    pub core: CoreId,
    pub assignments: usize,
    /// Ticks a process was running on this core.
    pub busy_ticks: Tick,
    pub idle_count: usize,
}

/// Aggregate statistics over a whole trace.
#[derive(Debug, Clone, Default)]
pub struct TraceStats {
    pub processes: HashMap<Pid, ProcessStats>,
    pub cores: HashMap<CoreId, CoreStats>,
    pub rejected: usize,
    pub turnaround: DistributionStats,
    pub waiting: DistributionStats,
    pub response: DistributionStats,
}

impl TraceStats {
    pub fn from_trace(trace: &Trace) -> Self {
        let mut stats = TraceStats::default();
        // Open run interval per process: (core, start tick).
        let mut running: HashMap<Pid, (CoreId, Tick)> = HashMap::new();

        for event in trace.events() {
            match event.kind {
                TraceKind::Arrived { pid } => {
                    stats.process(pid).arrival = Some(event.tick);
                }
                TraceKind::Rejected => stats.rejected += 1,
                TraceKind::Assigned { pid, .. } => {
                    let ps = stats.process(pid);
                    ps.schedule_count += 1;
                    ps.first_assigned.get_or_insert(event.tick);
                    if let Some(core) = event.core {
                        stats.core(core).assignments += 1;
                        running.insert(pid, (core, event.tick));
                    }
                }
                TraceKind::Preempted { pid } | TraceKind::Completed { pid } => {
                    if let TraceKind::Preempted { .. } = event.kind {
                        stats.process(pid).preempt_count += 1;
                    } else {
                        stats.process(pid).completion = Some(event.tick);
                    }
                    if let Some((core, start)) = running.remove(&pid) {
                        let interval = event.tick - start;
                        stats.process(pid).run_intervals.add(interval);
                        stats.core(core).busy_ticks += interval;
                    }
                }
                TraceKind::CoreIdle => {
                    if let Some(core) = event.core {
                        stats.core(core).idle_count += 1;
                    }
                }
            }
        }

        for ps in stats.processes.values() {
            if let Some(t) = ps.turnaround() {
                stats.turnaround.add(t);
            }
            if let Some(w) = ps.waiting() {
                stats.waiting.add(w);
            }
            if let Some(r) = ps.response() {
                stats.response.add(r);
            }
        }

        stats
    }

    fn process(&mut self, pid: Pid) -> &mut ProcessStats {
        self.processes.entry(pid).or_insert_with(|| ProcessStats {
            pid,
            ..Default::default()
        })
    }

    fn core(&mut self, core: CoreId) -> &mut CoreStats {
        self.cores.entry(core).or_insert_with(|| CoreStats {
            core,
            ..Default::default()
        })
    }

    /// Print a human-readable summary to stderr.
    pub fn print_summary(&self) {
        eprintln!("\n=== Run Statistics ===\n");

        eprintln!("--- Per-Process Statistics ---");
        let mut pids: Vec<_> = self.processes.keys().copied().collect();
        pids.sort();

        let opt = |v: Option<Tick>| v.map_or_else(|| "-".to_string(), |t| t.to_string());
        for pid in pids {
            let ps = &self.processes[&pid];
            eprintln!("  Process PID={}:", pid.0);
            eprintln!("    Schedules:    {}", ps.schedule_count);
            eprintln!("    Preemptions:  {}", ps.preempt_count);
            eprintln!(
                "    Run interval: {:.2} mean, {:.2} stddev",
                ps.run_intervals.mean(),
                ps.run_intervals.stddev()
            );
            eprintln!("    Turnaround:   {}", opt(ps.turnaround()));
            eprintln!("    Waiting:      {}", opt(ps.waiting()));
            eprintln!("    Response:     {}", opt(ps.response()));
        }
        eprintln!();

        eprintln!("--- Per-Core Statistics ---");
        let mut cores: Vec<_> = self.cores.keys().copied().collect();
        cores.sort();
        for core in cores {
            let cs = &self.cores[&core];
            eprintln!("  Core {}:", core.0);
            eprintln!("    Assignments: {}", cs.assignments);
            eprintln!("    Busy ticks:  {}", cs.busy_ticks);
            eprintln!("    Idle steps:  {}", cs.idle_count);
        }
        eprintln!();

        eprintln!("--- Global ---");
        eprintln!("  Rejected arrivals: {}", self.rejected);
        for (label, dist) in [
            ("Turnaround", &self.turnaround),
            ("Waiting", &self.waiting),
            ("Response", &self.response),
        ] {
            eprintln!(
                "  {label:<10}: n={} mean={:.2} min={} max={} stddev={:.2}",
                dist.count,
                dist.mean(),
                dist.min,
                dist.max,
                dist.stddev()
            );
        }
        eprintln!();
    }
}
