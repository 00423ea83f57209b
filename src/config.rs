//! Engine configuration and builder API.

use tracing::warn;

use crate::error::ConfigError;
use crate::types::Priority;

/// Seed used when neither the caller nor the environment provides one.
pub const DEFAULT_SEED: u64 = 42;

/// Environment variable consulted for the PRNG seed.
pub const SEED_ENV: &str = "SCX_PROCSIM_SEED";

/// Validated engine configuration. Ranges are inclusive `(min, max)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub num_cores: u32,
    pub priority_range: (Priority, Priority),
    pub burst_range: (u32, u32),
    pub time_slice_range: (u32, u32),
    pub ready_queue_capacity: u32,
    /// Maintain cosmetic per-core load/temperature readings.
    pub telemetry: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            num_cores: 4,
            priority_range: (-20, 20),
            burst_range: (1, 20),
            time_slice_range: (2, 6),
            ready_queue_capacity: 64,
            telemetry: true,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder {
            config: EngineConfig::default(),
        }
    }

    /// Check the configuration for structural problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_cores == 0 {
            return Err(ConfigError::ZeroCores);
        }
        let (lo, hi) = self.priority_range;
        if lo > hi {
            return Err(ConfigError::EmptyPriorityRange { lo, hi });
        }
        let (min, max) = self.burst_range;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidBurstRange { min, max });
        }
        let (min, max) = self.time_slice_range;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidTimeSliceRange { min, max });
        }
        if self.ready_queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }

    /// Whether `priority` lies inside the configured range.
    pub fn priority_in_range(&self, priority: Priority) -> bool {
        let (lo, hi) = self.priority_range;
        (lo..=hi).contains(&priority)
    }
}

/// Builder for [`EngineConfig`]. `build()` validates.
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the number of simulated cores.
    pub fn cores(mut self, n: u32) -> Self {
        self.config.num_cores = n;
        self
    }

    pub fn priority(mut self, lo: Priority, hi: Priority) -> Self {
        self.config.priority_range = (lo, hi);
        self
    }

    pub fn burst(mut self, min: u32, max: u32) -> Self {
        self.config.burst_range = (min, max);
        self
    }

    pub fn time_slice(mut self, min: u32, max: u32) -> Self {
        self.config.time_slice_range = (min, max);
        self
    }

    pub fn capacity(mut self, n: u32) -> Self {
        self.config.ready_queue_capacity = n;
        self
    }

    pub fn telemetry(mut self, enabled: bool) -> Self {
        self.config.telemetry = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parse a seed string: a `u64` integer or `"entropy"` for OS randomness.
/// `None` or an empty string yields [`DEFAULT_SEED`].
pub fn parse_seed(s: Option<&str>) -> Result<u64, String> {
    match s {
        None | Some("") => Ok(DEFAULT_SEED),
        Some(s) if s.eq_ignore_ascii_case("entropy") => {
            let seed: u64 = rand::random();
            warn!(
                seed,
                "seed=entropy: seeding PRNG with OS randomness \
                 (pass --seed {seed} to reproduce this run)"
            );
            Ok(seed)
        }
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("seed={s:?}: expected a u64 integer or \"entropy\"")),
    }
}

/// Read the seed from [`SEED_ENV`], falling back to [`DEFAULT_SEED`].
pub fn seed_from_env() -> Result<u64, String> {
    parse_seed(std::env::var(SEED_ENV).ok().as_deref())
}
