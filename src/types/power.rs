//! Power commands.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What [`crate::Bulb::set_power`] should do.
///
/// ```
/// use std::str::FromStr;
/// use tplight_rs::PowerMode;
///
/// assert_eq!(PowerMode::from_str("reboot").unwrap(), PowerMode::Reboot);
/// assert_eq!(PowerMode::Off.to_string(), "off");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerMode {
    On,
    Off,
    /// Restart the bulb after a one second delay. Light state is kept.
    Reboot,
}
