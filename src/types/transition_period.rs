//! Native transition duration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duration over which the bulb firmware fades to a new state, 0 to 100000 ms.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionPeriod {
    pub(crate) millis: u32,
}

impl TransitionPeriod {
    pub const MIN: u32 = 0;
    /// Longest fade the firmware performs in a single command.
    pub const MAX: u32 = 100_000;

    /// # Examples
    ///
    /// ```
    /// use tplight_rs::TransitionPeriod;
    ///
    /// assert_eq!(TransitionPeriod::create(100_000).unwrap().millis(), 100_000);
    /// assert!(TransitionPeriod::create(100_001).is_none());
    /// ```
    pub fn create(millis: u32) -> Option<Self> {
        (millis <= Self::MAX).then_some(TransitionPeriod { millis })
    }

    pub fn millis(&self) -> u32 {
        self.millis
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.millis))
    }
}
