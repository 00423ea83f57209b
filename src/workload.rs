//! JSON workload files.
//!
//! A workload describes a run: engine parameters, how long to run, and a
//! script of processes arriving at fixed ticks. Every field is optional.
//!
//! ```json
//! {
//!   "cores": 2, "ticks": 60, "seed": 7, "time_slice": [3, 5],
//!   "arrival_rate": 0.1,
//!   "processes": [
//!     { "name": "editor", "priority": 5, "burst": 12, "arrival": 0 },
//!     { "arrival": 10 }
//!   ]
//! }
//! ```
//!
//! C-style block comments (`/* ... */`) are stripped before parsing.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::process::ProcessSpec;
use crate::types::{Priority, Tick};

/// Errors that can occur when loading a workload.
#[derive(Debug)]
pub enum WorkloadError {
    /// JSON parse error.
    Json(serde_json::Error),
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The resulting engine configuration is invalid.
    Config(ConfigError),
    /// A field outside the engine configuration has an unusable value.
    InvalidValue(String),
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadError::Json(e) => write!(f, "JSON parse error: {e}"),
            WorkloadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            WorkloadError::Config(e) => write!(f, "invalid configuration: {e}"),
            WorkloadError::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
        }
    }
}

impl std::error::Error for WorkloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkloadError::Json(e) => Some(e),
            WorkloadError::Io { source, .. } => Some(source),
            WorkloadError::Config(e) => Some(e),
            WorkloadError::InvalidValue(_) => None,
        }
    }
}

impl From<serde_json::Error> for WorkloadError {
    fn from(e: serde_json::Error) -> Self {
        WorkloadError::Json(e)
    }
}

impl From<ConfigError> for WorkloadError {
    fn from(e: ConfigError) -> Self {
        WorkloadError::Config(e)
    }
}

/// A process arriving at a fixed tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedProcess {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub burst: Option<u32>,
    #[serde(default)]
    pub arrival: Tick,
}

impl ScriptedProcess {
    pub fn spec(&self) -> ProcessSpec {
        ProcessSpec {
            name: self.name.clone(),
            priority: self.priority,
            burst_time: self.burst,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Workload {
    pub cores: Option<u32>,
    pub ticks: Option<u64>,
    pub seed: Option<u64>,
    pub time_slice: Option<(u32, u32)>,
    pub priority: Option<(Priority, Priority)>,
    pub burst: Option<(u32, u32)>,
    pub capacity: Option<u32>,
    pub telemetry: Option<bool>,
    /// Per-tick probability of one extra randomly sampled arrival.
    pub arrival_rate: Option<f64>,
    #[serde(default)]
    pub processes: Vec<ScriptedProcess>,
}

impl Workload {
    /// Parse a workload from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, WorkloadError> {
        let cleaned = strip_comments(json);
        let workload: Workload = serde_json::from_str(&cleaned)?;
        if let Some(rate) = workload.arrival_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(WorkloadError::InvalidValue(format!(
                    "arrival_rate {rate} outside [0, 1]"
                )));
            }
        }
        Ok(workload)
    }

    /// Read and parse a workload file.
    pub fn from_path(path: &Path) -> Result<Self, WorkloadError> {
        let json = std::fs::read_to_string(path).map_err(|source| WorkloadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Overlay the fields this workload sets onto `base` and validate.
    pub fn engine_config(&self, base: EngineConfig) -> Result<EngineConfig, WorkloadError> {
        let mut config = base;
        if let Some(n) = self.cores {
            config.num_cores = n;
        }
        if let Some(range) = self.time_slice {
            config.time_slice_range = range;
        }
        if let Some(range) = self.priority {
            config.priority_range = range;
        }
        if let Some(range) = self.burst {
            config.burst_range = range;
        }
        if let Some(n) = self.capacity {
            config.ready_queue_capacity = n;
        }
        if let Some(t) = self.telemetry {
            config.telemetry = t;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Strip C-style block comments (`/* ... */`) from input.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = '\0';
            for c in chars.by_ref() {
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}
