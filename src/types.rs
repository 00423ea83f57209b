//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (process IDs, core IDs) prevent silent type
//! confusion. Type aliases for plain quantities (ticks, priorities) keep
//! the code self-documenting without implementing arithmetic traits.

use std::fmt;

use serde::Serialize;

/// Process identifier. Assigned by the engine in arrival order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
pub struct Pid(pub u32);

/// Core identifier. Cores are numbered `0..num_cores`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
pub struct CoreId(pub u32);

/// Simulated time, in discrete ticks since engine start.
pub type Tick = u64;

/// Scheduling priority. Higher values are scheduled first.
pub type Priority = i32;

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
