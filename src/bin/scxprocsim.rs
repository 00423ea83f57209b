//! scxprocsim: run multi-core scheduling simulations from the command line.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use scx_procsim::{
    parse_seed, EngineConfig, RunSummary, SimFormat, Simulation, StateView,
    TraceStats, Workload,
};

/// Default number of ticks when neither the workload nor `--ticks` sets one.
const DEFAULT_TICKS: u64 = 100;

/// Run multi-core scheduling simulations.
#[derive(Parser)]
#[command(name = "scxprocsim")]
struct Cli {
    /// Path to a JSON workload file.
    workload: Option<PathBuf>,

    /// Number of simulated cores.
    #[arg(short, long)]
    cores: Option<u32>,

    /// Number of ticks to simulate.
    #[arg(short, long)]
    ticks: Option<u64>,

    /// PRNG seed (u64 integer or "entropy" for OS randomness).
    ///
    /// Controls priority, burst and time-slice sampling as well as random
    /// arrivals. Precedence: this flag, then the SCX_PROCSIM_SEED env var,
    /// then the workload's "seed", then the default (42).
    #[arg(long, env = "SCX_PROCSIM_SEED")]
    seed: Option<String>,

    /// Inclusive time-slice range, e.g. "2:6".
    #[arg(long, value_name = "MIN:MAX", value_parser = parse_range)]
    time_slice: Option<(u32, u32)>,

    /// Ready-queue capacity.
    #[arg(long)]
    capacity: Option<u32>,

    /// Per-tick probability of one randomly sampled arrival.
    #[arg(long, value_name = "P")]
    arrival_rate: Option<f64>,

    /// Number of randomly sampled processes arriving at tick 0.
    #[arg(long, value_name = "N", default_value_t = 0)]
    initial: u32,

    /// Print trace events to stderr.
    #[arg(long)]
    dump_trace: bool,

    /// Print per-process and per-core statistics to stderr.
    #[arg(long)]
    stats: bool,

    /// Print the final state and metrics as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable per-core load/temperature readings.
    #[arg(long)]
    no_telemetry: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    seed: u64,
    summary: &'a RunSummary,
    state: &'a StateView,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let workload = match &cli.workload {
        Some(path) => Workload::from_path(path)
            .with_context(|| format!("failed to load workload {}", path.display()))?,
        None => Workload::default(),
    };

    // CLI flags override workload values.
    let mut config = workload
        .engine_config(EngineConfig::default())
        .context("invalid workload configuration")?;
    if let Some(n) = cli.cores {
        config.num_cores = n;
    }
    if let Some(range) = cli.time_slice {
        config.time_slice_range = range;
    }
    if let Some(n) = cli.capacity {
        config.ready_queue_capacity = n;
    }
    if cli.no_telemetry {
        config.telemetry = false;
    }

    let seed = resolve_seed(cli.seed.as_deref(), workload.seed)?;
    let ticks = cli.ticks.or(workload.ticks).unwrap_or(DEFAULT_TICKS);
    let arrival_rate = cli.arrival_rate.or(workload.arrival_rate).unwrap_or(0.0);
    if !(0.0..=1.0).contains(&arrival_rate) {
        bail!("--arrival-rate {arrival_rate} outside [0, 1]");
    }

    let mut sim = Simulation::from_seed(config, seed)?
        .with_scripted(workload.processes.iter().cloned())
        .with_arrival_rate(arrival_rate);
    for _ in 0..cli.initial {
        sim.arrive(None)?;
    }

    let summary = sim.run(ticks)?;

    if cli.dump_trace {
        sim.trace().dump();
    }
    if cli.stats {
        TraceStats::from_trace(sim.trace()).print_summary();
    }

    if cli.json {
        let state = sim.engine().snapshot_state();
        let report = JsonReport {
            seed,
            summary: &summary,
            state: &state,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let m = &summary.metrics;
        println!("ticks:            {}", m.tick);
        println!("completed:        {}", m.completed_count);
        println!("context switches: {}", m.context_switches);
        println!("preemptions:      {}", m.preemption_count);
        println!("rejected:         {}", summary.rejected);
        println!("cpu utilization:  {:.2}", m.cpu_utilization);
        println!("avg ready wait:   {:.2}", m.average_ready_wait);
        println!("throughput:       {:.3}", m.throughput);
    }

    Ok(())
}

/// Pick the run seed. `cli_seed` already folds in the env var via clap.
fn resolve_seed(cli_seed: Option<&str>, workload_seed: Option<u64>) -> Result<u64> {
    match (cli_seed, workload_seed) {
        (Some(s), _) => parse_seed(Some(s)).map_err(|e| anyhow!("--seed: {e}")),
        (None, Some(seed)) => Ok(seed),
        (None, None) => parse_seed(None).map_err(|e| anyhow!(e)),
    }
}

/// Parse an inclusive "MIN:MAX" range.
fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let (min, max) = s
        .split_once(':')
        .ok_or_else(|| format!("{s:?}: expected MIN:MAX"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("{s:?}: {v:?} is not a valid u32: {e}"))
    };
    Ok((parse(min)?, parse(max)?))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .event_format(SimFormat)
        .try_init();
}
