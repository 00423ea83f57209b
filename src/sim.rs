//! Simulation driver: feeds arrivals into an engine and records a trace.
//!
//! Each tick of [`Simulation::run`] injects the scripted arrivals due at
//! that tick in script order, then at most one random arrival, then steps
//! the engine. Whether a random arrival happens is decided by a driver RNG
//! separate from the engine's, so those coin flips never consume draws from
//! the engine's sampling stream.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::config::EngineConfig;
use crate::engine::SchedulerEngine;
use crate::error::{ArriveError, SimError};
use crate::metrics::MetricsSnapshot;
use crate::process::ProcessSpec;
use crate::trace::{Trace, TraceKind};
use crate::types::Pid;
use crate::workload::ScriptedProcess;

/// Mixed into the run seed to derive the driver RNG seed.
const DRIVER_SEED_SALT: u64 = 0x5eed;

/// Outcome of [`Simulation::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// Arrivals dropped because the ready queue was full, over the whole
    /// simulation.
    pub rejected: u64,
    pub metrics: MetricsSnapshot,
}

pub struct Simulation<R: Rng = SmallRng> {
    engine: SchedulerEngine<R>,
    trace: Trace,
    /// Sorted by arrival tick, script order kept on ties.
    scripted: Vec<ScriptedProcess>,
    next_scripted: usize,
    arrival_rate: f64,
    driver_rng: SmallRng,
    rejected: u64,
}

impl Simulation<SmallRng> {
    /// Build an engine seeded with `seed` and a simulation around it.
    pub fn from_seed(config: EngineConfig, seed: u64) -> Result<Self, SimError> {
        let engine = SchedulerEngine::from_seed(config, seed)?;
        Ok(Simulation::new(engine, seed))
    }
}

impl<R: Rng> Simulation<R> {
    pub fn new(engine: SchedulerEngine<R>, seed: u64) -> Self {
        Simulation {
            engine,
            trace: Trace::new(),
            scripted: Vec::new(),
            next_scripted: 0,
            arrival_rate: 0.0,
            driver_rng: SmallRng::seed_from_u64(seed ^ DRIVER_SEED_SALT),
            rejected: 0,
        }
    }

    /// Probability of one random arrival per tick. Clamped to `[0, 1]`.
    pub fn with_arrival_rate(mut self, rate: f64) -> Self {
        self.arrival_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    /// Add processes that arrive at fixed ticks.
    pub fn with_scripted(mut self, processes: impl IntoIterator<Item = ScriptedProcess>) -> Self {
        self.scripted.extend(processes);
        // Stable sort keeps script order among equal ticks.
        self.scripted[self.next_scripted..].sort_by_key(|p| p.arrival);
        self
    }

    pub fn engine(&self) -> &SchedulerEngine<R> {
        &self.engine
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Submit an arrival now, recording it in the trace.
    ///
    /// A full ready queue is not an error here: the arrival is recorded as
    /// rejected and `Ok(None)` is returned.
    pub fn arrive(&mut self, spec: Option<ProcessSpec>) -> Result<Option<Pid>, SimError> {
        let now = self.engine.current_tick();
        match self.engine.arrive(spec) {
            Ok(pid) => {
                self.trace.record(now, None, TraceKind::Arrived { pid });
                Ok(Some(pid))
            }
            Err(ArriveError::CapacityExceeded(_)) => {
                self.trace.record(now, None, TraceKind::Rejected);
                self.rejected += 1;
                Ok(None)
            }
            Err(ArriveError::Halted(v)) => Err(SimError::Invariant(v)),
            Err(e) => Err(e.into()),
        }
    }

    /// Run for `ticks` steps.
    pub fn run(&mut self, ticks: u64) -> Result<RunSummary, SimError> {
        for _ in 0..ticks {
            let now = self.engine.current_tick();

            while let Some(p) = self.scripted.get(self.next_scripted) {
                if p.arrival > now {
                    break;
                }
                let spec = p.spec();
                self.next_scripted += 1;
                self.arrive(Some(spec))?;
            }

            if self.arrival_rate > 0.0 && self.driver_rng.gen::<f64>() < self.arrival_rate {
                self.arrive(None)?;
            }

            let events = self.engine.step()?;
            self.trace.record_step(&events);
            for core in self.engine.state().cores() {
                if core.is_idle() {
                    self.trace.record(now, Some(core.id), TraceKind::CoreIdle);
                }
            }
        }

        let metrics = self.engine.snapshot_metrics();
        info!(
            ticks,
            completed = metrics.completed_count,
            context_switches = metrics.context_switches,
            rejected = self.rejected,
            "run finished"
        );
        Ok(RunSummary {
            ticks,
            rejected: self.rejected,
            metrics,
        })
    }
}
