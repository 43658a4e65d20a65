//! Protocol commands and response extraction.
//!
//! Every request is a single `{service: {method: args}}` object and the reply
//! mirrors that path, so a [`Command`] also knows where its result lives.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::change::LightStateChange;
use crate::errors::Error;
use crate::types::{TimezoneIndex, TransitionPeriod};

type Result<T> = std::result::Result<T, Error>;

pub const SYSTEM: &str = "system";
pub const LIGHTING_SERVICE: &str = "smartlife.iot.smartbulb.lightingservice";
pub const COMMON_SYSTEM: &str = "smartlife.iot.common.system";
pub const TIME_SETTING: &str = "smartlife.iot.common.timesetting";

/// One service/method call with its arguments.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tplight_rs::Command;
///
/// assert_eq!(
///     Command::get_sysinfo().to_value(),
///     json!({"system": {"get_sysinfo": {}}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    service: &'static str,
    method: &'static str,
    args: Value,
}

impl Command {
    pub fn new(service: &'static str, method: &'static str, args: Value) -> Self {
        Command {
            service,
            method,
            args,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn args(&self) -> &Value {
        &self.args
    }

    pub fn to_value(&self) -> Value {
        json!({ self.service: { self.method: self.args } })
    }

    pub fn get_sysinfo() -> Self {
        Command::new(SYSTEM, "get_sysinfo", json!({}))
    }

    pub fn get_light_details() -> Self {
        Command::new(LIGHTING_SERVICE, "get_light_details", json!(""))
    }

    /// Lighting command for a validated change, fading over `period`.
    ///
    /// `ignore_default` makes the bulb apply the fields as given instead of
    /// merging them with its stored power-on state.
    pub fn transition_light_state(
        change: &LightStateChange,
        period: TransitionPeriod,
    ) -> Result<Self> {
        let mut args = serde_json::to_value(change).map_err(Error::JsonDump)?;
        args["ignore_default"] = json!(1);
        args["transition_period"] = json!(period.millis());
        Ok(Command::new(LIGHTING_SERVICE, "transition_light_state", args))
    }

    pub fn reboot(delay_secs: u32) -> Self {
        Command::new(COMMON_SYSTEM, "reboot", json!({ "delay": delay_secs }))
    }

    pub fn set_alias(alias: &str) -> Self {
        Command::new(COMMON_SYSTEM, "set_dev_alias", json!({ "alias": alias }))
    }

    pub fn get_time() -> Self {
        Command::new(TIME_SETTING, "get_time", json!({}))
    }

    pub fn set_time(time: &NaiveDateTime) -> Result<Self> {
        let args = serde_json::to_value(DeviceTime::from(time)).map_err(Error::JsonDump)?;
        Ok(Command::new(TIME_SETTING, "set_time", args))
    }

    pub fn get_timezone() -> Self {
        Command::new(TIME_SETTING, "get_timezone", json!({}))
    }

    /// The bulb only accepts a timezone together with the current local time.
    pub fn set_timezone(index: TimezoneIndex, time: &NaiveDateTime) -> Result<Self> {
        let mut args = serde_json::to_value(DeviceTime::from(time)).map_err(Error::JsonDump)?;
        args["index"] = json!(index.index());
        Ok(Command::new(TIME_SETTING, "set_timezone", args))
    }

    /// The object at `response[service][method]`.
    pub fn result<'a>(&self, response: &'a Value) -> Result<&'a Value> {
        response
            .get(self.service)
            .and_then(|service| service.get(self.method))
            .ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "no {}.{} in response",
                    self.service, self.method
                ))
            })
    }

    /// Deserialize the result object of this command.
    pub fn parse<T: DeserializeOwned>(&self, response: &Value) -> Result<T> {
        T::deserialize(self.result(response)?).map_err(Error::JsonLoad)
    }
}

/// Clock representation used by `get_time`/`set_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DeviceTime {
    year: i32,
    month: u32,
    mday: u32,
    hour: u32,
    min: u32,
    sec: u32,
}

impl From<&NaiveDateTime> for DeviceTime {
    fn from(time: &NaiveDateTime) -> Self {
        DeviceTime {
            year: time.year(),
            month: time.month(),
            mday: time.day(),
            hour: time.hour(),
            min: time.minute(),
            sec: time.second(),
        }
    }
}

impl TryFrom<DeviceTime> for NaiveDateTime {
    type Error = Error;

    fn try_from(time: DeviceTime) -> Result<Self> {
        NaiveDate::from_ymd_opt(time.year, time.month, time.mday)
            .and_then(|date| date.and_hms_opt(time.hour, time.min, time.sec))
            .ok_or_else(|| Error::MalformedResponse(format!("invalid device time {time:?}")))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct TimezoneReply {
    pub index: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_transition_light_state_shape() {
        let mut change = LightStateChange::new();
        change.power(true).brightness(20).mode(Mode::Normal);
        let cmd = Command::transition_light_state(
            &change.validate().unwrap(),
            TransitionPeriod::create(700).unwrap(),
        )
        .unwrap();
        assert_eq!(
            cmd.to_value(),
            json!({LIGHTING_SERVICE: {"transition_light_state": {
                "ignore_default": 1,
                "transition_period": 700,
                "on_off": 1,
                "brightness": 20,
                "mode": "normal",
            }}})
        );
    }

    #[test]
    fn test_hue_sends_color_mode_sentinel() {
        let mut change = LightStateChange::new();
        change.hue(90);
        let cmd =
            Command::transition_light_state(&change.validate().unwrap(), TransitionPeriod::default())
                .unwrap();
        assert_eq!(cmd.args()["color_temp"], 0);
        assert_eq!(cmd.args()["hue"], 90);
    }

    #[test]
    fn test_set_timezone_carries_clock() {
        let cmd =
            Command::set_timezone(TimezoneIndex::create(12).unwrap(), &at(2024, 3, 9, 7, 5, 1))
                .unwrap();
        assert_eq!(
            cmd.to_value(),
            json!({TIME_SETTING: {"set_timezone": {
                "index": 12, "year": 2024, "month": 3, "mday": 9, "hour": 7, "min": 5, "sec": 1,
            }}})
        );
    }

    #[test]
    fn test_set_time_shape() {
        let cmd = Command::set_time(&at(2025, 1, 2, 3, 4, 5)).unwrap();
        assert_eq!(
            cmd.to_value(),
            json!({TIME_SETTING: {"set_time": {
                "year": 2025, "month": 1, "mday": 2, "hour": 3, "min": 4, "sec": 5,
            }}})
        );
    }

    #[test]
    fn test_result_follows_command_path() {
        let cmd = Command::get_time();
        let response = json!({TIME_SETTING: {"get_time": {
            "year": 2023, "month": 12, "mday": 31, "hour": 23, "min": 59, "sec": 58, "err_code": 0,
        }}});
        let time: DeviceTime = cmd.parse(&response).unwrap();
        assert_eq!(NaiveDateTime::try_from(time).unwrap(), at(2023, 12, 31, 23, 59, 58));

        let err = Command::get_timezone().result(&response).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_invalid_device_time() {
        let time = DeviceTime {
            year: 2023,
            month: 2,
            mday: 30,
            hour: 0,
            min: 0,
            sec: 0,
        };
        assert!(NaiveDateTime::try_from(time).is_err());
    }
}
