//! Static device information.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::state::SysInfo;

/// Hardware description of a bulb, read once when connecting.
///
/// Everything but the alias is fixed by the hardware; the alias follows
/// [`crate::Bulb::set_alias`] and every state refresh.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub alias: String,
    pub device_id: String,
    /// Beam angle in degrees.
    pub lamp_beam_angle: u32,
    pub min_voltage: u32,
    pub max_voltage: u32,
    pub wattage: u32,
    /// Wattage of the incandescent bulb it replaces.
    pub incandescent_equivalent: u32,
    pub max_lumens: u32,
    pub color_rendering_index: String,
}

impl DeviceIdentity {
    pub(crate) fn new(sysinfo: &SysInfo, details: &LightDetails) -> Self {
        DeviceIdentity {
            alias: sysinfo.alias.clone(),
            device_id: sysinfo.device_id.clone(),
            lamp_beam_angle: details.lamp_beam_angle,
            min_voltage: details.min_voltage,
            max_voltage: details.max_voltage,
            wattage: details.wattage,
            incandescent_equivalent: details.incandescent_equivalent,
            max_lumens: details.max_lumens,
            color_rendering_index: details.color_rendering_index.clone(),
        }
    }
}

/// `get_light_details` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LightDetails {
    pub lamp_beam_angle: u32,
    pub min_voltage: u32,
    pub max_voltage: u32,
    pub wattage: u32,
    pub incandescent_equivalent: u32,
    pub max_lumens: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub color_rendering_index: String,
}

/// Firmware versions disagree on whether the CRI is a number or a string.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cri_accepts_number_and_string() {
        let base = json!({
            "lamp_beam_angle": 180, "min_voltage": 110, "max_voltage": 120,
            "wattage": 10, "incandescent_equivalent": 60, "max_lumens": 800,
        });
        for (cri, expected) in [(json!(80), "80"), (json!("80"), "80")] {
            let mut value = base.clone();
            value["color_rendering_index"] = cri;
            let details: LightDetails = serde_json::from_value(value).unwrap();
            assert_eq!(details.color_rendering_index, expected);
        }
    }
}
