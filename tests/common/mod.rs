#![allow(dead_code)]

use scx_procsim::*;

/// Initialize tracing from `RUST_LOG` with the tick-stamped formatter.
///
/// `try_init()` is idempotent: first call in the process succeeds,
/// subsequent calls are silently ignored.
pub fn setup_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .event_format(SimFormat)
        .try_init();
}

/// Seeds used by the property checks.
pub const SEEDS: [u64; 8] = [0, 1, 2, 7, 42, 1337, 0xdead_beef, u64::MAX];

/// Engine with a fixed time slice so schedules are fully predictable.
pub fn fixed_slice_engine(cores: u32, slice: u32, capacity: u32) -> SchedulerEngine {
    let config = EngineConfig::builder()
        .cores(cores)
        .time_slice(slice, slice)
        .capacity(capacity)
        .build()
        .unwrap();
    SchedulerEngine::from_seed(config, 0).unwrap()
}

/// Engine with default sampling ranges and the given seed.
pub fn seeded_engine(cores: u32, capacity: u32, seed: u64) -> SchedulerEngine {
    let config = EngineConfig::builder()
        .cores(cores)
        .capacity(capacity)
        .build()
        .unwrap();
    SchedulerEngine::from_seed(config, seed).unwrap()
}

/// Step `ticks` times, collecting every event.
pub fn run_ticks(engine: &mut SchedulerEngine, ticks: u64) -> Vec<StepEvent> {
    let mut all = Vec::new();
    for _ in 0..ticks {
        all.extend(engine.step().unwrap());
    }
    all
}

/// `(tick, pid)` of every assignment in `events`.
pub fn assignments(events: &[StepEvent]) -> Vec<(Tick, Pid)> {
    events
        .iter()
        .filter_map(|e| match *e {
            StepEvent::Assigned { tick, pid, .. } => Some((tick, pid)),
            _ => None,
        })
        .collect()
}

/// Tick at which `pid` completed, if it did.
pub fn completion_tick(events: &[StepEvent], pid: Pid) -> Option<Tick> {
    events.iter().find_map(|e| match *e {
        StepEvent::Completed { tick, pid: p, .. } if p == pid => Some(tick),
        _ => None,
    })
}
