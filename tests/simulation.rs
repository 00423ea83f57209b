use std::io::Write;

use scx_procsim::*;

mod common;

const WORKLOAD: &str = r#"
/* Two interactive processes and a batch job on two cores. */
{
    "cores": 2,
    "ticks": 40,
    "seed": 7,
    "time_slice": [4, 4],
    "capacity": 8,
    "processes": [
        { "name": "editor", "priority": 10, "burst": 6, "arrival": 0 },
        { "name": "shell", "priority": 10, "burst": 3, "arrival": 0 },
        { "name": "build", "priority": -5, "burst": 12, "arrival": 0 },
        { "name": "late", "priority": 15, "burst": 2, "arrival": 5 }
    ]
}
"#;

fn simulation(workload: &Workload) -> Simulation {
    let config = workload.engine_config(EngineConfig::default()).unwrap();
    Simulation::from_seed(config, workload.seed.unwrap_or(DEFAULT_SEED))
        .unwrap()
        .with_scripted(workload.processes.iter().cloned())
        .with_arrival_rate(workload.arrival_rate.unwrap_or(0.0))
}

#[test]
fn test_workload_from_file() {
    common::setup_test();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(WORKLOAD.as_bytes()).unwrap();

    let workload = Workload::from_path(file.path()).unwrap();
    assert_eq!(workload.cores, Some(2));
    assert_eq!(workload.ticks, Some(40));
    assert_eq!(workload.processes.len(), 4);
    assert_eq!(workload.processes[3].arrival, 5);
}

#[test]
fn test_scripted_workload_schedule() {
    common::setup_test();
    let workload = Workload::from_json(WORKLOAD).unwrap();
    let mut sim = simulation(&workload);
    let summary = sim.run(workload.ticks.unwrap()).unwrap();
    let trace = sim.trace();
    trace.dump();

    let (editor, shell, build, late) = (Pid(1), Pid(2), Pid(3), Pid(4));

    // editor and shell share priority 10 and take both cores first.
    assert_eq!(&trace.assignment_order()[..2], &[editor, shell]);
    assert_eq!(trace.completion_tick(shell), Some(3));
    // build starts when shell leaves core 1.
    assert_eq!(trace.events().iter().find_map(|e| match e.kind {
        TraceKind::Assigned { pid, .. } if pid == build => Some(e.tick),
        _ => None,
    }), Some(3));
    // editor's slice ends at tick 4 and it immediately resumes.
    assert_eq!(trace.preempt_count(editor), 1);
    assert_eq!(trace.completion_tick(editor), Some(6));
    // late arrives at 5 and waits for editor's core.
    assert_eq!(trace.arrival_tick(late), Some(5));
    assert_eq!(trace.completion_tick(late), Some(8));

    for pid in [editor, shell, build, late] {
        assert!(trace.completion_tick(pid).is_some(), "{pid} did not complete");
    }
    assert_eq!(trace.total_runtime(build), 12);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.metrics.completed_count, 4);
    assert_eq!(summary.metrics.tick, 40);

    let stats = TraceStats::from_trace(trace);
    assert_eq!(stats.processes[&shell].response(), Some(0));
    assert_eq!(stats.processes[&build].response(), Some(3));
    assert_eq!(stats.processes[&late].turnaround(), Some(3));
    assert_eq!(stats.turnaround.count, 4);
}

#[test]
fn test_overloaded_queue_rejects_arrivals() {
    common::setup_test();
    let config = EngineConfig::builder()
        .cores(1)
        .burst(20, 20)
        .capacity(3)
        .build()
        .unwrap();
    let mut sim = Simulation::from_seed(config, 1).unwrap().with_arrival_rate(1.0);
    let summary = sim.run(50).unwrap();

    assert!(summary.rejected > 0);
    let rejected_events = sim
        .trace()
        .events()
        .iter()
        .filter(|e| matches!(e.kind, TraceKind::Rejected))
        .count() as u64;
    assert_eq!(rejected_events, summary.rejected);
    assert!(sim.engine().state().ready_queue().len() <= 3);
}

#[test]
fn test_run_can_resume() {
    let workload = Workload::from_json(WORKLOAD).unwrap();
    let mut whole = simulation(&workload);
    whole.run(20).unwrap();

    let mut split = simulation(&workload);
    split.run(4).unwrap();
    let summary = split.run(16).unwrap();

    assert_eq!(summary.ticks, 16);
    assert_eq!(summary.metrics.tick, 20);
    assert_eq!(split.trace(), whole.trace());
}

#[test]
fn test_summary_serializes() {
    let workload = Workload::from_json(WORKLOAD).unwrap();
    let mut sim = simulation(&workload);
    let summary = sim.run(10).unwrap();
    let json = serde_json::to_value(summary).unwrap();
    assert_eq!(json["ticks"], 10);
    assert_eq!(json["metrics"]["tick"], 10);
}
