//! Hue angle.

use serde::{Deserialize, Serialize};

/// Hue angle on the color wheel, 0 to 360 degrees.
///
/// Setting a hue switches the bulb into color mode.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hue {
    pub(crate) value: u16,
}

impl Hue {
    pub const MIN: u16 = 0;
    pub const MAX: u16 = 360;

    pub fn value(&self) -> u16 {
        self.value
    }

    /// # Examples
    ///
    /// ```
    /// use tplight_rs::Hue;
    ///
    /// assert_eq!(Hue::create(360).unwrap().value(), 360);
    /// assert!(Hue::create(361).is_none());
    /// ```
    pub fn create(value: u16) -> Option<Self> {
        (value <= Self::MAX).then_some(Hue { value })
    }

    pub fn clamped(value: i64) -> Self {
        Hue {
            value: value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u16,
        }
    }
}
