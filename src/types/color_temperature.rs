//! White color temperature.

use serde::{Deserialize, Serialize};

/// White color temperature in Kelvin, 2500K to 9000K.
///
/// The bulb reports `0` while it is in hue/saturation color mode; that value
/// is kept as [`ColorTemperature::COLOR_MODE`]. Lower values produce warmer
/// light:
/// - 2700K: Warm white (incandescent-like)
/// - 4000K: Neutral white
/// - 6500K: Daylight
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorTemperature {
    pub(crate) kelvin: u16,
}

impl ColorTemperature {
    pub const MIN: u16 = 2500;
    pub const MAX: u16 = 9000;

    /// Sentinel meaning "color mode active".
    pub const COLOR_MODE: ColorTemperature = ColorTemperature { kelvin: 0 };

    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// True when the value is the color mode sentinel rather than a temperature.
    pub fn is_color_mode(&self) -> bool {
        self.kelvin == 0
    }

    /// Create a color temperature, accepting the `0` sentinel.
    ///
    /// Returns `None` if value is neither `0` nor in the valid range (2500-9000).
    ///
    /// # Examples
    ///
    /// ```
    /// use tplight_rs::ColorTemperature;
    ///
    /// assert!(ColorTemperature::create(0).unwrap().is_color_mode());
    /// assert!(ColorTemperature::create(2499).is_none());
    /// assert!(ColorTemperature::create(2500).is_some());
    /// assert!(ColorTemperature::create(9000).is_some());
    /// assert!(ColorTemperature::create(9001).is_none());
    /// ```
    pub fn create(kelvin: u16) -> Option<Self> {
        if kelvin == 0 || (Self::MIN..=Self::MAX).contains(&kelvin) {
            Some(ColorTemperature { kelvin })
        } else {
            None
        }
    }

    /// Nearest real temperature. The sentinel is never produced, so a bulb in
    /// color mode reads as the warmest white.
    pub fn clamped(kelvin: i64) -> Self {
        ColorTemperature {
            kelvin: kelvin.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u16,
        }
    }
}
