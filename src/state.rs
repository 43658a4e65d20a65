//! Cached bulb state.

use serde::{Deserialize, Serialize};

use crate::change::LightStateChange;
use crate::errors::Error;
use crate::types::{Brightness, ColorTemperature, Hue, Mode, Saturation, TransitionPeriod};

type Result<T> = std::result::Result<T, Error>;

/// Last known visible state of a bulb.
///
/// Only [`crate::Bulb`] mutates it, and only after the bulb confirmed a
/// command, so every field always holds a value the bulb accepts.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulbState {
    on: bool,
    hue: Hue,
    saturation: Saturation,
    brightness: Brightness,
    color_temperature: ColorTemperature,
    mode: Mode,
    transition_period: TransitionPeriod,
}

impl BulbState {
    /// Check if the light is emitting.
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn hue(&self) -> Hue {
        self.hue
    }

    pub fn saturation(&self) -> Saturation {
        self.saturation
    }

    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// The white temperature, or [`ColorTemperature::COLOR_MODE`] while a hue is shown.
    pub fn color_temperature(&self) -> ColorTemperature {
        self.color_temperature
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Fade duration sent with every lighting command.
    pub fn transition_period(&self) -> TransitionPeriod {
        self.transition_period
    }

    pub(crate) fn set_transition_period(&mut self, period: TransitionPeriod) {
        self.transition_period = period;
    }

    /// Merge a change the bulb has confirmed. `change` must have passed
    /// [`LightStateChange::validate`].
    pub(crate) fn update_from_change(&mut self, change: &LightStateChange) {
        if let Some(on_off) = change.on_off {
            self.on = on_off != 0;
        }
        if let Some(hue) = change.hue.and_then(Hue::create) {
            self.hue = hue;
        }
        if let Some(saturation) = change.saturation.and_then(Saturation::create) {
            self.saturation = saturation;
        }
        if let Some(brightness) = change.brightness.and_then(Brightness::create) {
            self.brightness = brightness;
        }
        if let Some(kelvin) = change.color_temp.and_then(ColorTemperature::create) {
            self.color_temperature = kelvin;
        }
        if let Some(mode) = change.mode {
            self.mode = mode;
        }
        if let Some(period) = change.transition_period.and_then(TransitionPeriod::create) {
            self.transition_period = period;
        }
    }

    /// Replace power and visible fields with what the bulb reported.
    ///
    /// An off bulb reports its visible fields in `dft_on_state`, the state it
    /// returns to when switched on.
    pub(crate) fn update_from_report(&mut self, report: &LightStateReport) -> Result<()> {
        let visible = report.visible()?;
        self.on = report.on_off != 0;
        self.hue = Hue::clamped(i64::from(visible.hue));
        self.saturation = Saturation::clamped(i64::from(visible.saturation));
        self.brightness = Brightness::clamped(i64::from(visible.brightness));
        self.color_temperature = ColorTemperature::create(visible.color_temp)
            .unwrap_or_else(|| ColorTemperature::clamped(i64::from(visible.color_temp)));
        self.mode = visible.mode;
        Ok(())
    }
}

/// `get_sysinfo` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SysInfo {
    pub alias: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    pub light_state: LightStateReport,
}

/// `light_state` object as reported by the bulb.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LightStateReport {
    pub on_off: u8,
    pub mode: Option<Mode>,
    pub hue: Option<u16>,
    pub saturation: Option<u8>,
    pub color_temp: Option<u16>,
    pub brightness: Option<u8>,
    pub dft_on_state: Option<VisibleState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct VisibleState {
    pub mode: Mode,
    pub hue: u16,
    pub saturation: u8,
    pub color_temp: u16,
    pub brightness: u8,
}

impl LightStateReport {
    fn visible(&self) -> Result<VisibleState> {
        if self.on_off == 0 {
            return self.dft_on_state.clone().ok_or_else(|| {
                Error::MalformedResponse("off bulb reported no dft_on_state".to_string())
            });
        }

        let missing = |field: &str| Error::MalformedResponse(format!("light_state has no {field}"));
        Ok(VisibleState {
            mode: self.mode.ok_or_else(|| missing("mode"))?,
            hue: self.hue.ok_or_else(|| missing("hue"))?,
            saturation: self.saturation.ok_or_else(|| missing("saturation"))?,
            color_temp: self.color_temp.ok_or_else(|| missing("color_temp"))?,
            brightness: self.brightness.ok_or_else(|| missing("brightness"))?,
        })
    }
}
