use serde::{Deserialize, Serialize};

/// Color saturation, 0 to 100 percent.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Saturation {
    pub(crate) value: u8,
}

impl Saturation {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn create(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Saturation { value })
    }

    pub fn clamped(value: i64) -> Self {
        Saturation {
            value: value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8,
        }
    }
}
