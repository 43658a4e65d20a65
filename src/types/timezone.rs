use serde::{Deserialize, Serialize};

/// Index into the bulb firmware's timezone table, 0 to 109.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimezoneIndex {
    pub(crate) index: u8,
}

impl TimezoneIndex {
    pub const MAX: u8 = 109;

    pub fn index(&self) -> u8 {
        self.index
    }

    /// # Examples
    ///
    /// ```
    /// use tplight_rs::TimezoneIndex;
    ///
    /// assert!(TimezoneIndex::create(109).is_some());
    /// assert!(TimezoneIndex::create(110).is_none());
    /// ```
    pub fn create(index: u8) -> Option<Self> {
        (index <= Self::MAX).then_some(TimezoneIndex { index })
    }
}
