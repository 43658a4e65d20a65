//! Set of light state changes sent in one command.

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::{Brightness, ColorTemperature, Hue, Mode, Saturation, TransitionPeriod};

type Result<T> = std::result::Result<T, Error>;

/// Field changes to apply to a bulb in a single `transition_light_state` command.
///
/// Setters take raw values and never fail; ranges are checked by
/// [`LightStateChange::validate`], which [`crate::Bulb::apply`] runs before
/// touching the network.
///
/// ```
/// use tplight_rs::LightStateChange;
///
/// let mut change = LightStateChange::new();
/// change.hue(120).saturation(80).transition_period(1500);
/// assert!(change.validate().is_ok());
///
/// change.brightness(0);
/// assert!(change.validate().is_err());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightStateChange {
    pub(crate) on_off: Option<u8>,
    pub(crate) hue: Option<u16>,
    pub(crate) saturation: Option<u8>,
    pub(crate) brightness: Option<u8>,
    pub(crate) color_temp: Option<u16>,
    pub(crate) mode: Option<Mode>,
    pub(crate) transition_period: Option<u32>,
}

impl LightStateChange {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no device field is set. The transition period alone does not count.
    pub fn is_empty(&self) -> bool {
        self.on_off.is_none()
            && self.hue.is_none()
            && self.saturation.is_none()
            && self.brightness.is_none()
            && self.color_temp.is_none()
            && self.mode.is_none()
    }

    pub fn power(&mut self, on: bool) -> &mut Self {
        self.on_off = Some(u8::from(on));
        self
    }

    pub fn hue(&mut self, hue: u16) -> &mut Self {
        self.hue = Some(hue);
        self
    }

    pub fn saturation(&mut self, saturation: u8) -> &mut Self {
        self.saturation = Some(saturation);
        self
    }

    pub fn brightness(&mut self, brightness: u8) -> &mut Self {
        self.brightness = Some(brightness);
        self
    }

    /// Set the white color temperature in Kelvin.
    ///
    /// Cannot be combined with a hue or saturation unless it is the `0`
    /// color mode sentinel.
    pub fn color_temperature(&mut self, kelvin: u16) -> &mut Self {
        self.color_temp = Some(kelvin);
        self
    }

    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    /// Set the fade duration, which also becomes the bulb's default for later commands.
    pub fn transition_period(&mut self, millis: u32) -> &mut Self {
        self.transition_period = Some(millis);
        self
    }

    pub fn get_power(&self) -> Option<bool> {
        self.on_off.map(|v| v != 0)
    }

    pub fn get_hue(&self) -> Option<u16> {
        self.hue
    }

    pub fn get_saturation(&self) -> Option<u8> {
        self.saturation
    }

    pub fn get_brightness(&self) -> Option<u8> {
        self.brightness
    }

    pub fn get_color_temperature(&self) -> Option<u16> {
        self.color_temp
    }

    pub fn get_mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn get_transition_period(&self) -> Option<u32> {
        self.transition_period
    }

    /// Check every field against its range and the color mode rule.
    ///
    /// Returns the change as it will be sent: when a hue or saturation is
    /// present the color temperature is forced to the `0` sentinel.
    ///
    /// ```
    /// use tplight_rs::LightStateChange;
    ///
    /// let mut change = LightStateChange::new();
    /// change.saturation(40);
    /// assert_eq!(change.validate().unwrap().get_color_temperature(), Some(0));
    ///
    /// change.color_temperature(4000);
    /// assert!(change.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<LightStateChange> {
        let mut checked = self.clone();

        if let Some(hue) = self.hue {
            Hue::create(hue).ok_or_else(|| out_of_range("hue", hue, Hue::MIN, Hue::MAX))?;
        }
        if let Some(saturation) = self.saturation {
            Saturation::create(saturation).ok_or_else(|| {
                out_of_range("saturation", saturation, Saturation::MIN, Saturation::MAX)
            })?;
        }
        if let Some(brightness) = self.brightness {
            Brightness::create(brightness).ok_or_else(|| {
                out_of_range("brightness", brightness, Brightness::MIN, Brightness::MAX)
            })?;
        }
        if let Some(kelvin) = self.color_temp {
            ColorTemperature::create(kelvin).ok_or_else(|| {
                Error::validation(
                    "color_temperature",
                    format!(
                        "{kelvin} is neither 0 nor within {}..={}",
                        ColorTemperature::MIN,
                        ColorTemperature::MAX
                    ),
                )
            })?;
        }
        if let Some(millis) = self.transition_period {
            TransitionPeriod::create(millis).ok_or_else(|| {
                out_of_range(
                    "transition_period",
                    millis,
                    TransitionPeriod::MIN,
                    TransitionPeriod::MAX,
                )
            })?;
        }

        if self.hue.is_some() || self.saturation.is_some() {
            match self.color_temp {
                Some(kelvin) if kelvin != 0 => {
                    return Err(Error::validation(
                        "color_temperature",
                        "cannot be set together with hue or saturation",
                    ));
                }
                _ => checked.color_temp = Some(0),
            }
        }

        Ok(checked)
    }
}

fn out_of_range<T: std::fmt::Display>(field: &'static str, value: T, min: T, max: T) -> Error {
    Error::validation(field, format!("{value} is outside {min}..={max}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_only_set_fields() {
        let mut change = LightStateChange::new();
        change.brightness(40).mode(Mode::Circadian).transition_period(200);
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({"brightness": 40, "mode": "circadian", "transition_period": 200})
        );
    }

    #[test]
    fn test_sentinel_allowed_with_hue() {
        let mut change = LightStateChange::new();
        change.hue(10).color_temperature(0);
        assert_eq!(change.validate().unwrap().color_temp, Some(0));
    }

    #[test]
    fn test_range_errors_name_the_field() {
        let cases: [(LightStateChange, &str); 5] = [
            (LightStateChange { hue: Some(361), ..Default::default() }, "hue"),
            (LightStateChange { saturation: Some(101), ..Default::default() }, "saturation"),
            (LightStateChange { brightness: Some(0), ..Default::default() }, "brightness"),
            (LightStateChange { color_temp: Some(9001), ..Default::default() }, "color_temperature"),
            (
                LightStateChange { transition_period: Some(100_001), ..Default::default() },
                "transition_period",
            ),
        ];
        for (change, name) in cases {
            match change.validate() {
                Err(Error::Validation { field, .. }) => assert_eq!(field, name),
                other => panic!("{name}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_is_empty_ignores_period() {
        let mut change = LightStateChange::new();
        change.transition_period(10);
        assert!(change.is_empty());
        change.power(true);
        assert!(!change.is_empty());
    }
}
