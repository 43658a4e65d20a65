//! Brightness control.

use serde::{Deserialize, Serialize};

/// Brightness level from 1 to 100 percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new()
    }
}

impl Brightness {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    /// Full brightness.
    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is outside valid range (1-100).
    ///
    /// # Examples
    ///
    /// ```
    /// use tplight_rs::Brightness;
    ///
    /// assert!(Brightness::create(0).is_none());
    /// assert!(Brightness::create(1).is_some());
    /// assert!(Brightness::create(100).is_some());
    /// assert!(Brightness::create(101).is_none());
    /// ```
    pub fn create(value: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Brightness { value })
        } else {
            None
        }
    }

    /// Nearest valid brightness.
    pub fn clamped(value: i64) -> Self {
        Brightness {
            value: value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8,
        }
    }
}
