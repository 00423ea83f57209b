use std::collections::{HashMap, HashSet};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use scx_procsim::*;

mod common;

const TICKS: u64 = 300;

/// Drive `engine` with random arrivals from a separate RNG, calling
/// `check` after every step with that step's events.
fn drive(
    engine: &mut SchedulerEngine,
    seed: u64,
    mut check: impl FnMut(&SchedulerEngine, &[StepEvent], &[Pid]),
) {
    let mut driver = SmallRng::seed_from_u64(seed.wrapping_add(1));
    for _ in 0..TICKS {
        let mut arrived = Vec::new();
        for _ in 0..driver.gen_range(0..=2) {
            if let Ok(pid) = engine.arrive(None) {
                arrived.push(pid);
            }
        }
        let events = engine.step().unwrap();
        check(engine, &events, &arrived);
    }
}

/// Live processes are exactly the disjoint union of ready and running ones.
#[test]
fn test_partition_invariant() {
    common::setup_test();
    for seed in common::SEEDS {
        let mut engine = common::seeded_engine(3, 12, seed);
        let mut live: HashSet<Pid> = HashSet::new();

        drive(&mut engine, seed, |engine, events, arrived| {
            live.extend(arrived);
            for e in events {
                if let StepEvent::Completed { pid, .. } = e {
                    assert!(live.remove(pid), "seed {seed}: {pid} completed twice");
                }
            }

            let view = engine.snapshot_state();
            let ready: HashSet<_> = view.ready_pids().into_iter().collect();
            let running: HashSet<_> = view.running_pids().into_iter().collect();
            assert_eq!(ready.len(), view.ready.len(), "seed {seed}: duplicate in queue");
            assert!(ready.is_disjoint(&running), "seed {seed}: pid both ready and running");
            let union: HashSet<_> = ready.union(&running).copied().collect();
            assert_eq!(union, live, "seed {seed}: tick {}", view.tick);

            assert!(view.ready.len() <= engine.config().ready_queue_capacity as usize);
            for p in &view.ready {
                assert_eq!(p.state, ProcessState::Ready);
            }
            for c in &view.cores {
                if let Some(p) = &c.running {
                    assert_eq!(p.state, ProcessState::Running);
                    assert!(p.time_slice_remaining > 0);
                }
            }
        });
    }
}

/// Running processes lose exactly one tick of work and slice per step;
/// ready processes keep their remaining work; slices are only refilled on
/// (re)assignment.
#[test]
fn test_monotonicity() {
    common::setup_test();
    for seed in common::SEEDS {
        let mut engine = common::seeded_engine(2, 10, seed);
        let mut last: HashMap<Pid, (u32, u32, ProcessState)> = HashMap::new();

        drive(&mut engine, seed, |engine, events, _| {
            let assigned: HashSet<Pid> = events
                .iter()
                .filter(|e| matches!(e, StepEvent::Assigned { .. }))
                .map(StepEvent::pid)
                .collect();

            let view = engine.snapshot_state();
            let running = view.cores.iter().filter_map(|c| c.running.as_ref());
            let mut current = HashMap::new();
            for p in running.chain(view.ready.iter()) {
                let (remaining, slice) = (p.remaining_time, p.time_slice_remaining);
                assert!(remaining <= p.burst_time);
                let tag = format!("seed {seed} tick {}: pid {}", view.tick, p.pid);

                match last.get(&p.pid) {
                    None => assert_eq!(remaining, p.burst_time, "{tag}: fresh arrival ran"),
                    Some(&(prev_remaining, prev_slice, prev_state)) => {
                        if prev_state == ProcessState::Running {
                            assert_eq!(remaining, prev_remaining - 1, "{tag}: remaining");
                        } else {
                            assert_eq!(remaining, prev_remaining, "{tag}: ready work changed");
                        }
                        if p.state == ProcessState::Running && !assigned.contains(&p.pid) {
                            assert_eq!(prev_state, ProcessState::Running, "{tag}: not assigned");
                            assert_eq!(slice, prev_slice - 1, "{tag}: slice");
                        }
                        if slice > prev_slice {
                            assert!(assigned.contains(&p.pid), "{tag}: slice grew");
                        }
                    }
                }
                if p.state == ProcessState::Ready {
                    assert_eq!(slice, 0, "{tag}: ready process holds a slice");
                }
                current.insert(p.pid, (remaining, slice, p.state));
            }
            last = current;
        });
    }
}

/// A completed process ran for exactly its burst time.
#[test]
fn test_conservation_on_completion() {
    common::setup_test();
    for seed in common::SEEDS {
        let mut engine = common::seeded_engine(4, 16, seed);
        let mut bursts: HashMap<Pid, u32> = HashMap::new();
        let mut running_since: HashMap<Pid, Tick> = HashMap::new();
        let mut ran: HashMap<Pid, u64> = HashMap::new();
        let mut completed = 0;

        drive(&mut engine, seed, |engine, events, arrived| {
            let view = engine.snapshot_state();
            for pid in arrived {
                if let Some(p) = view.process(*pid) {
                    bursts.insert(*pid, p.burst_time);
                }
            }
            for e in events {
                match *e {
                    StepEvent::Assigned { tick, pid, .. } => {
                        running_since.insert(pid, tick);
                    }
                    StepEvent::Preempted { tick, pid, .. } => {
                        let start = running_since.remove(&pid).unwrap();
                        *ran.entry(pid).or_default() += tick - start;
                    }
                    StepEvent::Completed { tick, pid, .. } => {
                        let start = running_since.remove(&pid).unwrap();
                        let total = ran.remove(&pid).unwrap_or(0) + tick - start;
                        assert_eq!(
                            total,
                            u64::from(bursts[&pid]),
                            "seed {seed}: {pid} ran {total} ticks"
                        );
                        completed += 1;
                    }
                }
            }
        });

        assert!(completed > 0, "seed {seed}: nothing completed");
        assert_eq!(engine.state().completed_count(), completed);
    }
}

/// Same seed and call sequence give the same events and final state.
#[test]
fn test_determinism() {
    common::setup_test();
    for seed in common::SEEDS {
        let run = || {
            let mut engine = common::seeded_engine(3, 8, seed);
            let mut all = Vec::new();
            drive(&mut engine, seed, |_, events, _| all.extend_from_slice(events));
            (all, engine.snapshot_state(), engine.snapshot_metrics())
        };
        assert_eq!(run(), run(), "seed {seed}");
    }
}

/// Different seeds give different schedules.
#[test]
fn test_seed_changes_schedule() {
    let run = |seed| {
        let mut engine = common::seeded_engine(2, 8, seed);
        let mut all = Vec::new();
        drive(&mut engine, 5, |_, events, _| all.extend_from_slice(events));
        all
    };
    assert_ne!(run(1), run(2));
}
