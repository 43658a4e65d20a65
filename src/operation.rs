//! Closed set of operations a forwarding layer can invoke on a bulb.
//!
//! A web or CLI front end maps its own vocabulary onto [`Operation`] and
//! hands it to [`Bulb::execute`]; nothing reaches the bulb without passing
//! the same validation as the typed methods.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

use crate::bulb::Bulb;
use crate::change::LightStateChange;
use crate::errors::Error;
use crate::transition::TransitionTarget;
use crate::transport::Transport;
use crate::types::{
    Brightness, ColorTemperature, Hue, Mode, Saturation, TimezoneIndex, TransitionPeriod,
};

type Result<T> = std::result::Result<T, Error>;

/// Readable bulb fields.
///
/// ```
/// use std::str::FromStr;
/// use tplight_rs::Field;
///
/// assert_eq!(Field::from_str("color_temperature").unwrap(), Field::ColorTemperature);
/// assert_eq!(Field::TransitionPeriod.to_string(), "transition_period");
/// assert!(Field::from_str("volume").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Power,
    Hue,
    Saturation,
    Brightness,
    ColorTemperature,
    Mode,
    TransitionPeriod,
    Alias,
}

/// Value of one [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Power(bool),
    Hue(Hue),
    Saturation(Saturation),
    Brightness(Brightness),
    ColorTemperature(ColorTemperature),
    Mode(Mode),
    TransitionPeriod(TransitionPeriod),
    Alias(String),
}

impl FieldValue {
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Power(_) => Field::Power,
            FieldValue::Hue(_) => Field::Hue,
            FieldValue::Saturation(_) => Field::Saturation,
            FieldValue::Brightness(_) => Field::Brightness,
            FieldValue::ColorTemperature(_) => Field::ColorTemperature,
            FieldValue::Mode(_) => Field::Mode,
            FieldValue::TransitionPeriod(_) => Field::TransitionPeriod,
            FieldValue::Alias(_) => Field::Alias,
        }
    }
}

/// Everything a bulb can be asked to do.
///
/// Deserializes from `{"cmd": <name>, "arg": <argument>}`, so a forwarding
/// layer can decode requests straight into it:
///
/// ```
/// use tplight_rs::{Field, Operation};
///
/// let op: Operation = serde_json::from_str(r#"{"cmd": "set_brightness", "arg": 40}"#).unwrap();
/// assert_eq!(op, Operation::SetBrightness(40));
///
/// let op: Operation = serde_json::from_str(r#"{"cmd": "get", "arg": "hue"}"#).unwrap();
/// assert_eq!(op, Operation::Get(Field::Hue));
///
/// let op: Operation = serde_json::from_str(r#"{"cmd": "toggle"}"#).unwrap();
/// assert_eq!(op, Operation::Toggle);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "arg", rename_all = "snake_case")]
pub enum Operation {
    Get(Field),
    SetHue(u16),
    SetSaturation(u8),
    SetBrightness(u8),
    OffsetBrightness(i16),
    SetColorTemperature(u16),
    SetMode(Mode),
    SetTransitionPeriod(u32),
    Apply {
        change: LightStateChange,
        #[serde(default)]
        synchronous: bool,
    },
    Pulse {
        period_ms: u32,
        diff: i16,
    },
    On,
    Off,
    Toggle,
    Reboot,
    SetAlias(String),
    GetTime,
    SetTime(NaiveDateTime),
    GetTimezone,
    SetTimezone(u8),
    Status,
    LongTransition {
        target: TransitionTarget,
        duration_ms: u64,
    },
}

/// Result of [`Bulb::execute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Field(FieldValue),
    Time(NaiveDateTime),
    Timezone(TimezoneIndex),
    Status(Value),
}

impl<T: Transport> Bulb<T> {
    /// Run one [`Operation`].
    pub async fn execute(&mut self, operation: Operation) -> Result<Outcome> {
        let outcome = match operation {
            Operation::Get(field) => Outcome::Field(self.get(field).await?),
            Operation::SetHue(hue) => done(self.set_hue(hue).await)?,
            Operation::SetSaturation(saturation) => done(self.set_saturation(saturation).await)?,
            Operation::SetBrightness(brightness) => done(self.set_brightness(brightness).await)?,
            Operation::OffsetBrightness(offset) => done(self.offset_brightness(offset).await)?,
            Operation::SetColorTemperature(kelvin) => {
                done(self.set_color_temperature(kelvin).await)?
            }
            Operation::SetMode(mode) => done(self.set_mode(mode).await)?,
            Operation::SetTransitionPeriod(millis) => done(self.set_transition_period(millis))?,
            Operation::Apply {
                change,
                synchronous,
            } => done(self.apply(&change, synchronous).await)?,
            Operation::Pulse { period_ms, diff } => done(self.pulse(period_ms, diff).await)?,
            Operation::On => done(self.on().await)?,
            Operation::Off => done(self.off().await)?,
            Operation::Toggle => done(self.toggle().await)?,
            Operation::Reboot => done(self.reboot().await)?,
            Operation::SetAlias(alias) => done(self.set_alias(&alias).await)?,
            Operation::GetTime => Outcome::Time(self.time().await?),
            Operation::SetTime(time) => done(self.set_time(&time).await)?,
            Operation::GetTimezone => Outcome::Timezone(self.timezone().await?),
            Operation::SetTimezone(index) => done(self.set_timezone(index).await)?,
            Operation::Status => Outcome::Status(self.status().await?),
            Operation::LongTransition {
                target,
                duration_ms,
            } => done(self.long_transition(&target, duration_ms).await)?,
        };
        Ok(outcome)
    }
}

fn done(result: Result<()>) -> Result<Outcome> {
    result.map(|()| Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use std::net::Ipv4Addr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_field_round_trips_through_its_name() {
        for field in Field::iter() {
            assert_eq!(field.to_string().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn test_decode_compound_operations() {
        let op: Operation = serde_json::from_str(
            r#"{"cmd": "apply", "arg": {"change": {"hue": 10, "transition_period": 500}}}"#,
        )
        .unwrap();
        let mut change = LightStateChange::new();
        change.hue(10).transition_period(500);
        assert_eq!(
            op,
            Operation::Apply {
                change,
                synchronous: false
            }
        );

        let op: Operation = serde_json::from_str(
            r#"{"cmd": "long_transition", "arg": {"target": {"brightness": 80}, "duration_ms": 600000}}"#,
        )
        .unwrap();
        assert!(matches!(op, Operation::LongTransition { duration_ms: 600_000, .. }));

        assert!(serde_json::from_str::<Operation>(r#"{"cmd": "__init__"}"#).is_err());
    }

    #[tokio::test]
    async fn test_execute_dispatches() {
        let transport = MockTransport::new();
        let requests = transport.requests();
        let mut bulb = Bulb::with_transport(Ipv4Addr::LOCALHOST, transport)
            .await
            .unwrap();

        assert_eq!(
            bulb.execute(Operation::Get(Field::Alias)).await.unwrap(),
            Outcome::Field(FieldValue::Alias("Bedside".into()))
        );
        assert_eq!(
            bulb.execute(Operation::SetBrightness(70)).await.unwrap(),
            Outcome::Done
        );
        assert_eq!(bulb.state().brightness().value(), 70);
        assert!(matches!(
            bulb.execute(Operation::GetTimezone).await.unwrap(),
            Outcome::Timezone(tz) if tz.index() == 6
        ));

        let before = requests.len();
        let err = bulb.execute(Operation::SetHue(400)).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(requests.len(), before);
    }

    #[test]
    fn test_field_value_reports_field() {
        assert_eq!(FieldValue::Power(true).field(), Field::Power);
        assert_eq!(
            FieldValue::ColorTemperature(ColorTemperature::COLOR_MODE).field(),
            Field::ColorTemperature
        );
    }
}
