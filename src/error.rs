//! Error taxonomy for the engine.
//!
//! - [`ConfigError`]: structurally invalid configuration or process spec.
//! - [`CapacityExceeded`]: the ready queue is full (the routine, recoverable error).
//! - [`InvariantViolation`]: internal state is inconsistent. Once returned, the
//!   engine refuses further work and keeps returning the same violation.

use std::fmt;

use crate::process::ProcessState;
use crate::types::{CoreId, Pid, Priority, Tick};
use crate::workload::WorkloadError;

/// Invalid engine configuration or explicit process parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `num_cores` is zero.
    ZeroCores,
    /// Priority range with `lo > hi`.
    EmptyPriorityRange { lo: Priority, hi: Priority },
    /// Burst range with a zero bound or `min > max`.
    InvalidBurstRange { min: u32, max: u32 },
    /// Time-slice range with a zero bound or `min > max`.
    InvalidTimeSliceRange { min: u32, max: u32 },
    /// `ready_queue_capacity` is zero.
    ZeroQueueCapacity,
    /// An explicit process spec asked for `burst_time == 0`.
    ZeroBurst,
    /// An explicit process priority lies outside the configured range.
    PriorityOutOfRange {
        priority: Priority,
        lo: Priority,
        hi: Priority,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCores => write!(f, "num_cores must be greater than zero"),
            ConfigError::EmptyPriorityRange { lo, hi } => {
                write!(f, "empty priority range {lo}..={hi}")
            }
            ConfigError::InvalidBurstRange { min, max } => {
                write!(f, "invalid burst range {min}..={max} (bounds must be > 0, min <= max)")
            }
            ConfigError::InvalidTimeSliceRange { min, max } => write!(
                f,
                "invalid time slice range {min}..={max} (bounds must be > 0, min <= max)"
            ),
            ConfigError::ZeroQueueCapacity => {
                write!(f, "ready_queue_capacity must be greater than zero")
            }
            ConfigError::ZeroBurst => write!(f, "burst_time must be greater than zero"),
            ConfigError::PriorityOutOfRange { priority, lo, hi } => {
                write!(f, "priority {priority} outside configured range {lo}..={hi}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// `arrive()` found the ready queue full. The arrival was dropped and the
/// queue left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    pub capacity: usize,
}

impl fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ready queue full (capacity {})", self.capacity)
    }
}

impl std::error::Error for CapacityExceeded {}

/// Which internal-consistency check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A pid is referenced from more than one place.
    DuplicatePid { pid: Pid },
    /// A process sits in a collection that disagrees with its state.
    StateMismatch {
        pid: Pid,
        expected: ProcessState,
        found: ProcessState,
    },
    /// A live process has no work left, or more than its burst.
    RemainingOutOfRange { pid: Pid, remaining: u32, burst: u32 },
    /// A running process holds an exhausted time slice.
    ExhaustedSlice { pid: Pid, core: CoreId },
    /// The ready queue grew past its capacity.
    QueueOverCapacity { len: usize, capacity: usize },
    /// More completions than assignments.
    CounterMismatch { context_switches: u64, completed: u64 },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::DuplicatePid { pid } => {
                write!(f, "pid {pid} referenced from more than one collection")
            }
            ViolationKind::StateMismatch {
                pid,
                expected,
                found,
            } => write!(f, "pid {pid} expected state {expected:?}, found {found:?}"),
            ViolationKind::RemainingOutOfRange {
                pid,
                remaining,
                burst,
            } => write!(
                f,
                "pid {pid} remaining_time {remaining} outside 1..={burst}"
            ),
            ViolationKind::ExhaustedSlice { pid, core } => {
                write!(f, "pid {pid} running on core {core} with no time slice left")
            }
            ViolationKind::QueueOverCapacity { len, capacity } => {
                write!(f, "ready queue holds {len} processes, capacity {capacity}")
            }
            ViolationKind::CounterMismatch {
                context_switches,
                completed,
            } => write!(
                f,
                "completed_count {completed} exceeds context_switch_count {context_switches}"
            ),
        }
    }
}

/// A failed internal-consistency check. Signals a bug, not a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Tick at which the check ran.
    pub tick: Tick,
    pub kind: ViolationKind,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violated at tick {}: {}", self.tick, self.kind)
    }
}

impl std::error::Error for InvariantViolation {}

/// Errors from `SchedulerEngine::arrive`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArriveError {
    /// The ready queue is full; the newest arrival was rejected.
    CapacityExceeded(CapacityExceeded),
    /// The explicit process spec is invalid for this configuration.
    InvalidProcess(ConfigError),
    /// The engine halted on an earlier invariant violation.
    Halted(InvariantViolation),
}

impl fmt::Display for ArriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArriveError::CapacityExceeded(e) => write!(f, "{e}"),
            ArriveError::InvalidProcess(e) => write!(f, "invalid process: {e}"),
            ArriveError::Halted(e) => write!(f, "engine halted: {e}"),
        }
    }
}

impl std::error::Error for ArriveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArriveError::CapacityExceeded(e) => Some(e),
            ArriveError::InvalidProcess(e) => Some(e),
            ArriveError::Halted(e) => Some(e),
        }
    }
}

impl From<CapacityExceeded> for ArriveError {
    fn from(e: CapacityExceeded) -> Self {
        ArriveError::CapacityExceeded(e)
    }
}

/// Umbrella error for the simulation driver.
#[derive(Debug)]
pub enum SimError {
    Config(ConfigError),
    Arrive(ArriveError),
    Invariant(InvariantViolation),
    Workload(WorkloadError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(e) => write!(f, "configuration error: {e}"),
            SimError::Arrive(e) => write!(f, "arrival failed: {e}"),
            SimError::Invariant(e) => write!(f, "{e}"),
            SimError::Workload(e) => write!(f, "workload error: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            SimError::Arrive(e) => Some(e),
            SimError::Invariant(e) => Some(e),
            SimError::Workload(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Config(e)
    }
}

impl From<ArriveError> for SimError {
    fn from(e: ArriveError) -> Self {
        SimError::Arrive(e)
    }
}

impl From<InvariantViolation> for SimError {
    fn from(e: InvariantViolation) -> Self {
        SimError::Invariant(e)
    }
}

impl From<WorkloadError> for SimError {
    fn from(e: WorkloadError) -> Self {
        SimError::Workload(e)
    }
}
