//! scx_procsim - Tick-driven multi-core process scheduling simulator.
//!
//! Simulates a fixed set of cores sharing one bounded ready queue. Time
//! advances in discrete ticks; each tick runs execution, completion,
//! preemption and assignment phases in that order. Assignment is
//! priority-based with FIFO tie-breaking, and every running process gets a
//! randomly sampled time slice from a seeded PRNG so runs are reproducible.
//!
//! # Architecture
//!
//! - **Engine**: owns the cores, ready queue and counters; advances one tick per step
//! - **Queue**: bounded FIFO of ready processes with priority selection
//! - **Metrics/Views**: pure read-only snapshots of engine state
//! - **Simulation**: drives an engine from scripted and random arrivals and records a trace
//! - **Workload**: JSON description of a run
//!
//! # Usage
//!
//! ```rust,no_run
//! use scx_procsim::*;
//!
//! let config = EngineConfig::builder().cores(2).time_slice(3, 5).build()?;
//! let mut engine = SchedulerEngine::from_seed(config, 42)?;
//!
//! engine.arrive(Some(ProcessSpec::new(10, 8).named("editor")))?;
//! engine.arrive(None)?;
//! for _ in 0..20 {
//!     engine.step()?;
//! }
//!
//! let metrics = engine.snapshot_metrics();
//! println!("completed {} processes", metrics.completed_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod cpu;
pub mod engine;
pub mod error;
pub mod fmt;
pub mod metrics;
pub mod process;
pub mod queue;
pub mod sim;
pub mod stats;
pub mod telemetry;
pub mod trace;
pub mod types;
pub mod view;
pub mod workload;

// Re-export the main public types for convenience.
pub use config::{parse_seed, seed_from_env, EngineConfig, EngineConfigBuilder, DEFAULT_SEED};
pub use engine::{SchedulerEngine, SchedulerState, StepEvent, StepEvents};
pub use error::{
    ArriveError, CapacityExceeded, ConfigError, InvariantViolation, SimError, ViolationKind,
};
pub use fmt::{FmtTick, SimFormat};
pub use metrics::MetricsSnapshot;
pub use process::{Process, ProcessSpec, ProcessState};
pub use sim::{RunSummary, Simulation};
pub use stats::TraceStats;
pub use trace::{Trace, TraceEvent, TraceKind};
pub use types::{CoreId, Pid, Priority, Tick};
pub use view::{CoreView, ProcessView, StateView};
pub use workload::{ScriptedProcess, Workload, WorkloadError};
