//! Cosmetic per-core telemetry for presentation layers.
//!
//! Load is an exponential moving average of busy ticks; temperature relaxes
//! toward a load-dependent target. Both are pure decoration and have no
//! effect on scheduling decisions.

use serde::Serialize;

/// Smoothing factor applied per tick.
const ALPHA: f64 = 0.25;
/// Idle temperature in degrees Celsius.
const AMBIENT_C: f64 = 35.0;
/// Degrees added per percent of load at steady state.
const C_PER_LOAD_PCT: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoreTelemetry {
    /// Smoothed load in percent, `0.0..=100.0`.
    pub load_pct: f64,
    /// Simulated die temperature in degrees Celsius.
    pub temperature_c: f64,
}

impl Default for CoreTelemetry {
    fn default() -> Self {
        CoreTelemetry {
            load_pct: 0.0,
            temperature_c: AMBIENT_C,
        }
    }
}

impl CoreTelemetry {
    /// Fold one tick of activity into the readings.
    pub fn update(&mut self, busy: bool) {
        let sample = if busy { 100.0 } else { 0.0 };
        self.load_pct += ALPHA * (sample - self.load_pct);
        let target = AMBIENT_C + C_PER_LOAD_PCT * self.load_pct;
        self.temperature_c += ALPHA * (target - self.temperature_c);
    }
}
