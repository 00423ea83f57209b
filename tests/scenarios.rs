use scx_procsim::*;

mod common;

/// Higher priority runs first; nothing is preempted when slices outlast bursts.
#[test]
fn test_priority_order_without_preemption() {
    common::setup_test();
    let mut engine = common::fixed_slice_engine(1, 10, 8);
    let p1 = engine.arrive(Some(ProcessSpec::new(5, 3).named("P1"))).unwrap();
    let p2 = engine.arrive(Some(ProcessSpec::new(10, 3).named("P2"))).unwrap();

    let events = common::run_ticks(&mut engine, 10);

    assert_eq!(common::assignments(&events), vec![(0, p2), (3, p1)]);
    assert_eq!(common::completion_tick(&events, p2), Some(3));
    assert_eq!(common::completion_tick(&events, p1), Some(6));
    assert_eq!(engine.state().context_switch_count(), 2);
    assert_eq!(engine.state().preemption_count(), 0);
    assert_eq!(engine.state().completed_count(), 2);
}

/// Equal priorities alternate round-robin as slices expire.
#[test]
fn test_round_robin_equal_priority() {
    common::setup_test();
    let mut engine = common::fixed_slice_engine(1, 5, 8);
    let p1 = engine.arrive(Some(ProcessSpec::new(1, 20))).unwrap();
    let p2 = engine.arrive(Some(ProcessSpec::new(1, 20))).unwrap();

    let mut switches = Vec::new();
    let mut events = Vec::new();
    for _ in 0..45 {
        events.extend(engine.step().unwrap());
        switches.push(engine.state().context_switch_count());
    }

    assert_eq!(
        common::assignments(&events),
        vec![
            (0, p1),
            (5, p2),
            (10, p1),
            (15, p2),
            (20, p1),
            (25, p2),
            (30, p1),
            (35, p2),
        ]
    );

    // The preempted process goes to the tail, behind the waiting one.
    let preempted: Vec<_> = events
        .iter()
        .filter_map(|e| match *e {
            StepEvent::Preempted { tick, pid, .. } => Some((tick, pid)),
            _ => None,
        })
        .collect();
    assert_eq!(
        preempted,
        vec![(5, p1), (10, p2), (15, p1), (20, p2), (25, p1), (30, p2)]
    );

    // One context switch per assignment, resumptions included.
    assert_eq!(switches[0], 1);
    assert_eq!(switches[4], 1);
    assert_eq!(switches[5], 2);
    assert_eq!(switches[10], 3);
    assert_eq!(engine.state().context_switch_count(), 8);

    assert_eq!(common::completion_tick(&events, p1), Some(35));
    assert_eq!(common::completion_tick(&events, p2), Some(40));
}

/// The (N+1)-th arrival into a full queue is rejected without side effects.
#[test]
fn test_capacity_boundary() {
    common::setup_test();
    let mut engine = common::fixed_slice_engine(1, 3, 4);
    for _ in 0..4 {
        engine.arrive(None).unwrap();
    }
    let before = engine.snapshot_state();

    assert_eq!(
        engine.arrive(None),
        Err(ArriveError::CapacityExceeded(CapacityExceeded { capacity: 4 }))
    );
    assert_eq!(engine.snapshot_state(), before);

    // Room frees up once a process moves to a core.
    engine.step().unwrap();
    assert_eq!(engine.arrive(None), Ok(Pid(5)));
}

/// A rejected arrival consumes neither a PID nor random draws.
#[test]
fn test_rejection_leaves_random_stream_untouched() {
    let mut full = common::seeded_engine(1, 1, 9);
    let mut fresh = common::seeded_engine(1, 1, 9);

    full.arrive(None).unwrap();
    fresh.arrive(None).unwrap();
    assert!(full.arrive(None).is_err());

    full.step().unwrap();
    fresh.step().unwrap();
    assert_eq!(full.arrive(None), fresh.arrive(None));
    assert_eq!(full.snapshot_state(), fresh.snapshot_state());
}

/// Stepping with nothing to run assigns nothing and leaves cores idle.
#[test]
fn test_zero_eligible_processes() {
    common::setup_test();
    let mut engine = common::fixed_slice_engine(4, 3, 8);
    let events = engine.step().unwrap();

    assert!(events.is_empty());
    let metrics = engine.snapshot_metrics();
    assert_eq!(metrics.cpu_utilization, 0.0);
    assert_eq!(metrics.context_switches, 0);
    assert_eq!(metrics.tick, 1);
}

/// Cores are filled in ID order from the queue head.
#[test]
fn test_idle_cores_filled_in_order() {
    let mut engine = common::fixed_slice_engine(3, 4, 8);
    let a = engine.arrive(Some(ProcessSpec::new(0, 9))).unwrap();
    let b = engine.arrive(Some(ProcessSpec::new(3, 9))).unwrap();

    engine.step().unwrap();
    let view = engine.snapshot_state();
    assert_eq!(view.running_pids(), vec![b, a]);
    assert!(view.cores[2].running.is_none());
    assert_eq!(engine.snapshot_metrics().cpu_utilization, 2.0 / 3.0);
}

/// A process that completes frees its core for reassignment in the same tick.
#[test]
fn test_completion_frees_core_same_tick() {
    let mut engine = common::fixed_slice_engine(1, 10, 8);
    let a = engine.arrive(Some(ProcessSpec::new(0, 1))).unwrap();
    let b = engine.arrive(Some(ProcessSpec::new(0, 1))).unwrap();

    let events = common::run_ticks(&mut engine, 3);
    assert_eq!(common::assignments(&events), vec![(0, a), (1, b)]);
    assert_eq!(common::completion_tick(&events, a), Some(1));
    assert_eq!(common::completion_tick(&events, b), Some(2));
}
