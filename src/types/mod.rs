//! Value types for bulb state fields.
//!
//! Each numeric type only holds values the bulb accepts. `create` rejects
//! anything outside the range; `clamped` pulls an arbitrary value into it.

mod brightness;
mod color_temperature;
mod hue;
mod mode;
mod power;
mod saturation;
mod timezone;
mod transition_period;

pub use brightness::Brightness;
pub use color_temperature::ColorTemperature;
pub use hue::Hue;
pub use mode::Mode;
pub use power::PowerMode;
pub use saturation::Saturation;
pub use timezone::TimezoneIndex;
pub use transition_period::TransitionPeriod;
