//! Clock stamps derived from simulator millisecond timestamps

use serde::{Deserialize, Serialize};

const NANOS_PER_MILLI: u32 = 1_000_000;

/// A (seconds, nanoseconds) timestamp as consumed by the control stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClockStamp {
    pub secs: u64,
    pub nsecs: u32,
}

impl ClockStamp {
    /// Split a millisecond timestamp into whole seconds and nanoseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self { secs: ms / 1000, nsecs: (ms % 1000) as u32 * NANOS_PER_MILLI }
    }

    /// Seconds as a float, for logging.
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + f64::from(self.nsecs) / 1e9
    }
}

impl From<ClockStamp> for std::time::Duration {
    fn from(stamp: ClockStamp) -> Self {
        std::time::Duration::new(stamp.secs, stamp.nsecs)
    }
}
