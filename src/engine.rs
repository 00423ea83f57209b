//! Tick-driven scheduling engine.
//!
//! This is the core of the simulator. It owns the cores, the ready queue and
//! the counters, and advances simulated time one tick per [`SchedulerEngine::step`]
//! call. Each step runs four phases in a fixed order:
//!
//! 1. **Execution**: every running process loses one tick of remaining
//!    work and one tick of time slice.
//! 2. **Completion**: processes with no work left leave their core and are
//!    dropped.
//! 3. **Preemption**: processes with an exhausted slice go back to the tail
//!    of the ready queue. Completion wins when both hit zero together.
//! 4. **Assignment**: idle cores, in core order, take the highest-priority
//!    eligible process, nearest the queue head on ties, with a freshly
//!    sampled time slice.
//!
//! The engine is a synchronous state machine with no interior locking.
//! Callers sharing it across threads must serialize access themselves.

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::cpu::Core;
use crate::error::{
    ArriveError, CapacityExceeded, ConfigError, InvariantViolation, ViolationKind,
};
use crate::fmt::set_log_tick;
use crate::metrics::MetricsSnapshot;
use crate::process::{Process, ProcessSpec, ProcessState};
use crate::queue::ReadyQueue;
use crate::types::{CoreId, Pid, Tick};
use crate::view::{CoreView, ProcessView, StateView};

/// Something that happened during a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepEvent {
    /// A process finished its burst and left the engine.
    Completed { tick: Tick, core: CoreId, pid: Pid },
    /// A process exhausted its time slice and returned to the ready queue.
    Preempted { tick: Tick, core: CoreId, pid: Pid },
    /// A process was placed on an idle core.
    Assigned {
        tick: Tick,
        core: CoreId,
        pid: Pid,
        time_slice: u32,
    },
}

impl StepEvent {
    pub fn pid(&self) -> Pid {
        match *self {
            StepEvent::Completed { pid, .. }
            | StepEvent::Preempted { pid, .. }
            | StepEvent::Assigned { pid, .. } => pid,
        }
    }

    pub fn core(&self) -> CoreId {
        match *self {
            StepEvent::Completed { core, .. }
            | StepEvent::Preempted { core, .. }
            | StepEvent::Assigned { core, .. } => core,
        }
    }

    pub fn tick(&self) -> Tick {
        match *self {
            StepEvent::Completed { tick, .. }
            | StepEvent::Preempted { tick, .. }
            | StepEvent::Assigned { tick, .. } => tick,
        }
    }
}

/// Events of one step, in the order they occurred.
pub type StepEvents = Vec<StepEvent>;

/// The engine's complete mutable state.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    cores: Vec<Core>,
    ready_queue: ReadyQueue,
    current_tick: Tick,
    completed_count: u64,
    context_switch_count: u64,
    preemption_count: u64,
}

impl SchedulerState {
    fn new(config: &EngineConfig) -> Self {
        SchedulerState {
            cores: (0..config.num_cores).map(|i| Core::new(CoreId(i))).collect(),
            ready_queue: ReadyQueue::new(config.ready_queue_capacity as usize),
            current_tick: 0,
            completed_count: 0,
            context_switch_count: 0,
            preemption_count: 0,
        }
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.ready_queue
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn context_switch_count(&self) -> u64 {
        self.context_switch_count
    }

    pub fn preemption_count(&self) -> u64 {
        self.preemption_count
    }

    /// Number of processes still alive (ready or running).
    pub fn live_count(&self) -> usize {
        self.ready_queue.len() + self.cores.iter().filter(|c| !c.is_idle()).count()
    }

    /// Verify the structural invariants that must hold between steps.
    pub fn check_invariants(&self) -> Result<(), ViolationKind> {
        let capacity = self.ready_queue.capacity();
        if self.ready_queue.len() > capacity {
            return Err(ViolationKind::QueueOverCapacity {
                len: self.ready_queue.len(),
                capacity,
            });
        }
        if self.completed_count > self.context_switch_count {
            return Err(ViolationKind::CounterMismatch {
                context_switches: self.context_switch_count,
                completed: self.completed_count,
            });
        }

        let mut seen = HashSet::new();
        let queued = self
            .ready_queue
            .iter()
            .map(|p| (p, ProcessState::Ready, None::<CoreId>));
        let running = self
            .cores
            .iter()
            .filter_map(|c| c.running().map(|p| (p, ProcessState::Running, Some(c.id))));

        for (p, expected, core) in queued.chain(running) {
            if !seen.insert(p.pid()) {
                return Err(ViolationKind::DuplicatePid { pid: p.pid() });
            }
            if p.state() != expected {
                return Err(ViolationKind::StateMismatch {
                    pid: p.pid(),
                    expected,
                    found: p.state(),
                });
            }
            if p.remaining_time() == 0 || p.remaining_time() > p.burst_time() {
                return Err(ViolationKind::RemainingOutOfRange {
                    pid: p.pid(),
                    remaining: p.remaining_time(),
                    burst: p.burst_time(),
                });
            }
            if let Some(core) = core {
                if p.time_slice_remaining() == 0 {
                    return Err(ViolationKind::ExhaustedSlice { pid: p.pid(), core });
                }
            }
        }
        Ok(())
    }
}

/// The scheduling engine, generic over its random source.
pub struct SchedulerEngine<R: Rng = SmallRng> {
    config: EngineConfig,
    state: SchedulerState,
    rng: R,
    next_pid: u32,
    /// Set once an invariant check fails; the engine refuses work afterwards.
    halted: Option<InvariantViolation>,
}

impl SchedulerEngine<SmallRng> {
    /// Build an engine whose random source is a `SmallRng` seeded with `seed`.
    pub fn from_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SchedulerEngine<R> {
    pub fn new(config: EngineConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            cores = config.num_cores,
            capacity = config.ready_queue_capacity,
            "engine initialized"
        );
        Ok(SchedulerEngine {
            state: SchedulerState::new(&config),
            config,
            rng,
            next_pid: 1,
            halted: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn current_tick(&self) -> Tick {
        self.state.current_tick
    }

    /// The violation that halted the engine, if any.
    pub fn halted(&self) -> Option<&InvariantViolation> {
        self.halted.as_ref()
    }

    /// Insert a new `Ready` process at the ready-queue tail.
    ///
    /// `None` samples every field; a [`ProcessSpec`] fixes some of them.
    /// When the queue is full the arrival is rejected before anything is
    /// sampled, so neither the queue nor the random stream changes.
    pub fn arrive(&mut self, spec: Option<ProcessSpec>) -> Result<Pid, ArriveError> {
        if let Some(v) = &self.halted {
            return Err(ArriveError::Halted(v.clone()));
        }
        let now = self.state.current_tick;
        if self.state.ready_queue.is_full() {
            warn!(
                tick = now,
                capacity = self.state.ready_queue.capacity(),
                "arrival rejected: ready queue full"
            );
            return Err(ArriveError::CapacityExceeded(CapacityExceeded {
                capacity: self.state.ready_queue.capacity(),
            }));
        }

        let pid = Pid(self.next_pid);
        let process = Process::sample(
            pid,
            spec.unwrap_or_default(),
            &self.config,
            &mut self.rng,
            now,
        )
        .map_err(ArriveError::InvalidProcess)?;
        debug!(
            tick = now,
            pid = pid.0,
            name = process.name(),
            priority = process.priority(),
            burst = process.burst_time(),
            "ARRIVED"
        );
        self.state.ready_queue.push_arrival(process)?;
        self.next_pid += 1;
        Ok(pid)
    }

    /// Advance simulated time by one tick.
    ///
    /// Fails only if the state was found inconsistent on entry. The engine
    /// then stays halted and every later call returns the same violation.
    pub fn step(&mut self) -> Result<StepEvents, InvariantViolation> {
        if let Some(v) = &self.halted {
            return Err(v.clone());
        }
        let now = self.state.current_tick;
        set_log_tick(now);

        if let Err(kind) = self.state.check_invariants() {
            let violation = InvariantViolation { tick: now, kind };
            error!(tick = now, "{violation}");
            self.halted = Some(violation.clone());
            return Err(violation);
        }

        let mut events = StepEvents::new();
        self.execute();
        self.complete(now, &mut events);
        self.preempt(now, &mut events);
        self.assign(now, &mut events);

        if self.config.telemetry {
            for core in &mut self.state.cores {
                let busy = !core.is_idle();
                core.telemetry.update(busy);
            }
        }

        self.state.current_tick += 1;
        Ok(events)
    }

    fn execute(&mut self) {
        for core in &mut self.state.cores {
            if let Some(p) = core.running.as_mut() {
                p.remaining_time -= 1;
                p.time_slice_remaining -= 1;
                core.busy_ticks += 1;
            }
        }
    }

    fn complete(&mut self, now: Tick, events: &mut StepEvents) {
        for core in &mut self.state.cores {
            if !core.running.as_ref().is_some_and(|p| p.remaining_time == 0) {
                continue;
            }
            if let Some(mut p) = core.running.take() {
                p.state = ProcessState::Completed;
                self.state.completed_count += 1;
                info!(
                    tick = now,
                    core = core.id.0,
                    pid = p.pid().0,
                    name = p.name(),
                    turnaround = p.waited(now),
                    "COMPLETED"
                );
                events.push(StepEvent::Completed {
                    tick: now,
                    core: core.id,
                    pid: p.pid(),
                });
            }
        }
    }

    fn preempt(&mut self, now: Tick, events: &mut StepEvents) {
        for core in &mut self.state.cores {
            if !core
                .running
                .as_ref()
                .is_some_and(|p| p.time_slice_remaining == 0)
            {
                continue;
            }
            if let Some(p) = core.running.take() {
                let pid = p.pid();
                info!(
                    tick = now,
                    core = core.id.0,
                    pid = pid.0,
                    name = p.name(),
                    remaining = p.remaining_time(),
                    "PREEMPTED"
                );
                self.state.ready_queue.requeue(p);
                self.state.preemption_count += 1;
                events.push(StepEvent::Preempted {
                    tick: now,
                    core: core.id,
                    pid,
                });
            }
        }
    }

    fn assign(&mut self, now: Tick, events: &mut StepEvents) {
        let (min, max) = self.config.time_slice_range;
        for core in &mut self.state.cores {
            if !core.is_idle() {
                continue;
            }
            let Some(mut p) = self.state.ready_queue.pop_next(now) else {
                break;
            };
            let time_slice = self.rng.gen_range(min..=max);
            p.state = ProcessState::Running;
            p.time_slice_remaining = time_slice;
            self.state.context_switch_count += 1;
            debug!(
                tick = now,
                core = core.id.0,
                pid = p.pid().0,
                name = p.name(),
                priority = p.priority(),
                slice = time_slice,
                "ASSIGNED"
            );
            events.push(StepEvent::Assigned {
                tick: now,
                core: core.id,
                pid: p.pid(),
                time_slice,
            });
            core.running = Some(p);
        }
    }

    /// Read-only copy of the cores and ready queue.
    pub fn snapshot_state(&self) -> StateView {
        StateView {
            tick: self.state.current_tick,
            cores: self
                .state
                .cores
                .iter()
                .map(|c| CoreView::new(c, self.config.telemetry))
                .collect(),
            ready: self.state.ready_queue.iter().map(ProcessView::from).collect(),
        }
    }

    pub fn snapshot_metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::from_state(&self.state)
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SchedulerState {
        &mut self.state
    }
}
