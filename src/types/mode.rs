use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Operating mode of the bulb.
///
/// In circadian mode the bulb follows its own daylight schedule.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Circadian,
}
