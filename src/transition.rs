//! Fades longer than the firmware's transition period limit.
//!
//! The bulb interpolates a single command over at most
//! [`TransitionPeriod::MAX`] milliseconds. A longer fade is planned as a
//! sequence of synchronous commands, each moving every field a proportional
//! part of the way, with the last step landing exactly on the target.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bulb::Bulb;
use crate::change::LightStateChange;
use crate::errors::Error;
use crate::state::BulbState;
use crate::transport::Transport;
use crate::types::{Brightness, ColorTemperature, Hue, Saturation, TransitionPeriod};

type Result<T> = std::result::Result<T, Error>;

/// Final values of a long transition.
///
/// Values are clamped into each field's range when the plan is built, so a
/// brightness of `0` ends at `1` and a color temperature of `10000` at `9000`.
///
/// ```
/// use tplight_rs::TransitionTarget;
///
/// let target = TransitionTarget::new().brightness(60).color_temperature(3600);
/// assert_eq!(target.get_brightness(), Some(60));
/// assert!(target.get_hue().is_none());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTarget {
    brightness: Option<i64>,
    color_temperature: Option<i64>,
    hue: Option<i64>,
    saturation: Option<i64>,
}

impl TransitionTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brightness(mut self, brightness: i64) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn color_temperature(mut self, kelvin: i64) -> Self {
        self.color_temperature = Some(kelvin);
        self
    }

    pub fn hue(mut self, hue: i64) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn saturation(mut self, saturation: i64) -> Self {
        self.saturation = Some(saturation);
        self
    }

    pub fn get_brightness(&self) -> Option<i64> {
        self.brightness
    }

    pub fn get_color_temperature(&self) -> Option<i64> {
        self.color_temperature
    }

    pub fn get_hue(&self) -> Option<i64> {
        self.hue
    }

    pub fn get_saturation(&self) -> Option<i64> {
        self.saturation
    }

    fn check(&self) -> Result<()> {
        if self.brightness.is_none()
            && self.color_temperature.is_none()
            && self.hue.is_none()
            && self.saturation.is_none()
        {
            return Err(Error::validation("target", "no field to transition"));
        }
        if self.color_temperature.is_some() && (self.hue.is_some() || self.saturation.is_some()) {
            return Err(Error::validation(
                "color_temperature",
                "cannot be set together with hue or saturation",
            ));
        }
        Ok(())
    }
}

/// Start and end value of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    from: i64,
    to: i64,
}

impl Span {
    /// Value after step `n` of `steps`.
    fn at(&self, n: u64, steps: u64) -> i64 {
        if n >= steps {
            return self.to;
        }
        let progress = n as f64 / steps as f64;
        (self.from as f64 + (self.to - self.from) as f64 * progress).round() as i64
    }
}

/// One command of a long transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionStep {
    pub duration: TransitionPeriod,
    pub change: LightStateChange,
}

/// Sequence of commands that together perform a long transition.
///
/// Steps are computed on demand, so a plan costs the same whatever its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    brightness: Option<Span>,
    color_temperature: Option<Span>,
    hue: Option<Span>,
    saturation: Option<Span>,
    total_ms: u64,
    max_step: u32,
    count: u64,
}

impl TransitionPlan {
    /// Plan a fade from `state` to `target` over `total_ms`, in steps of at
    /// most [`TransitionPeriod::MAX`].
    ///
    /// ```
    /// use tplight_rs::{BulbState, TransitionPlan, TransitionTarget};
    ///
    /// let target = TransitionTarget::new().brightness(1);
    /// let plan = TransitionPlan::build(&BulbState::default(), &target, 250_000).unwrap();
    /// assert_eq!(plan.durations().collect::<Vec<_>>(), vec![100_000, 100_000, 50_000]);
    /// ```
    pub fn build(state: &BulbState, target: &TransitionTarget, total_ms: u64) -> Result<Self> {
        Self::with_max_step(state, target, total_ms, TransitionPeriod::MAX)
    }

    pub fn with_max_step(
        state: &BulbState,
        target: &TransitionTarget,
        total_ms: u64,
        max_step: u32,
    ) -> Result<Self> {
        target.check()?;
        if max_step == 0 || max_step > TransitionPeriod::MAX {
            return Err(Error::validation(
                "max_step",
                format!("{max_step} is outside 1..={}", TransitionPeriod::MAX),
            ));
        }

        let brightness = target.brightness.map(|to| Span {
            from: i64::from(state.brightness().value()),
            to: i64::from(Brightness::clamped(to).value()),
        });
        // A bulb in color mode reports 0, which starts the fade from the warmest white.
        let color_temperature = target.color_temperature.map(|to| {
            let current = i64::from(state.color_temperature().kelvin());
            Span {
                from: i64::from(ColorTemperature::clamped(current).kelvin()),
                to: i64::from(ColorTemperature::clamped(to).kelvin()),
            }
        });
        let hue = target.hue.map(|to| Span {
            from: i64::from(state.hue().value()),
            to: i64::from(Hue::clamped(to).value()),
        });
        let saturation = target.saturation.map(|to| Span {
            from: i64::from(state.saturation().value()),
            to: i64::from(Saturation::clamped(to).value()),
        });

        Ok(TransitionPlan {
            brightness,
            color_temperature,
            hue,
            saturation,
            total_ms,
            max_step,
            count: step_count(total_ms, max_step),
        })
    }

    /// Number of steps, `ceil(total_ms / max_step)`, and at least one.
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Step `n`, counting from 1.
    pub fn step(&self, n: u64) -> Option<TransitionStep> {
        if n == 0 || n > self.count {
            return None;
        }
        let millis = step_duration(n, self.count, self.total_ms, self.max_step);
        let mut change = LightStateChange::new();
        change.transition_period(millis);
        // Spans hold clamped values, so every cast below is in range.
        if let Some(span) = self.brightness {
            change.brightness(span.at(n, self.count) as u8);
        }
        if let Some(span) = self.color_temperature {
            change.color_temperature(span.at(n, self.count) as u16);
        }
        if let Some(span) = self.hue {
            change.hue(span.at(n, self.count) as u16);
        }
        if let Some(span) = self.saturation {
            change.saturation(span.at(n, self.count) as u8);
        }
        Some(TransitionStep {
            duration: TransitionPeriod { millis },
            change,
        })
    }

    pub fn steps(&self) -> impl Iterator<Item = TransitionStep> + '_ {
        (1..=self.count).filter_map(move |n| self.step(n))
    }

    /// Duration of every step in milliseconds.
    pub fn durations(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=self.count).map(move |n| step_duration(n, self.count, self.total_ms, self.max_step))
    }
}

/// `ceil(total_ms / max_step)`; a zero duration still takes one step.
fn step_count(total_ms: u64, max_step: u32) -> u64 {
    total_ms.div_ceil(u64::from(max_step)).max(1)
}

/// Duration of step `n` of `count`: `max_step`, except the last step, which
/// takes the remainder (or `max_step` when there is none).
fn step_duration(n: u64, count: u64, total_ms: u64, max_step: u32) -> u32 {
    if total_ms == 0 {
        return 0;
    }
    if n < count {
        return max_step;
    }
    match total_ms % u64::from(max_step) {
        0 => max_step,
        rest => rest as u32,
    }
}

/// Progress of a running long transition, as logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Planning,
    Executing { step: u64, of: u64 },
    Completed,
    Failed,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionPhase::Planning => write!(f, "planning"),
            TransitionPhase::Executing { step, of } => write!(f, "executing step {step} of {of}"),
            TransitionPhase::Completed => write!(f, "completed"),
            TransitionPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Fade `bulb` to `target` over `total_ms`.
///
/// Steps run one after another, each waiting for its fade to finish. A bulb
/// that is off is switched on by the first step. The first failing step
/// stops the transition; steps already applied stay applied.
pub async fn run<T: Transport>(
    bulb: &mut Bulb<T>,
    target: &TransitionTarget,
    total_ms: u64,
) -> Result<()> {
    let ip = bulb.ip();
    debug!("{ip} transition {}", TransitionPhase::Planning);

    let plan = TransitionPlan::build(bulb.state(), target, total_ms).inspect_err(|e| {
        debug!("{ip} transition {}: {e}", TransitionPhase::Failed);
    })?;

    let of = plan.len();
    for (n, step) in (1..).zip(plan.steps()) {
        let phase = TransitionPhase::Executing { step: n, of };
        debug!("{ip} transition {phase} ({} ms)", step.duration.millis());

        let change = bulb.with_power_on_if_off(&step.change);
        if let Err(e) = bulb.apply(&change, true).await {
            debug!("{ip} transition {}: {e}", TransitionPhase::Failed);
            return Err(e);
        }
    }

    debug!("{ip} transition {}", TransitionPhase::Completed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, default_light_state, reply};
    use proptest::prelude::*;
    use serde_json::json;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn values(plan: &TransitionPlan, get: impl Fn(&LightStateChange) -> Option<u16>) -> Vec<u16> {
        plan.steps().filter_map(|s| get(&s.change)).collect()
    }

    fn durations(total_ms: u64, max_step: u32) -> Vec<u32> {
        let target = TransitionTarget::new().brightness(50);
        TransitionPlan::with_max_step(&BulbState::default(), &target, total_ms, max_step)
            .unwrap()
            .durations()
            .collect()
    }

    #[test]
    fn test_step_durations() {
        assert_eq!(durations(250_000, 100_000), vec![100_000, 100_000, 50_000]);
        assert_eq!(durations(200_000, 100_000), vec![100_000, 100_000]);
        assert_eq!(durations(1, 100_000), vec![1]);
        assert_eq!(durations(0, 100_000), vec![0]);
        assert_eq!(durations(10, 3), vec![3, 3, 3, 1]);
    }

    proptest! {
        #[test]
        fn durations_split_total(total_ms in 1u64..5_000_000, max_step in 1u32..=100_000) {
            let durations = durations(total_ms, max_step);
            prop_assert_eq!(durations.len() as u64, total_ms.div_ceil(u64::from(max_step)));
            prop_assert!(durations.iter().all(|d| *d >= 1 && *d <= max_step));
            prop_assert_eq!(durations.iter().map(|d| u64::from(*d)).sum::<u64>(), total_ms);
        }
    }

    #[test]
    fn test_huge_duration_is_planned_lazily() {
        let target = TransitionTarget::new().brightness(5);
        let plan = TransitionPlan::build(&BulbState::default(), &target, u64::MAX).unwrap();

        assert_eq!(plan.len(), u64::MAX.div_ceil(100_000));
        let first = plan.step(1).unwrap();
        assert_eq!(first.duration.millis(), 100_000);
        assert_eq!(first.change.get_brightness(), Some(100));

        let last = plan.step(plan.len()).unwrap();
        assert_eq!(last.duration.millis(), (u64::MAX % 100_000) as u32);
        assert_eq!(last.change.get_brightness(), Some(5));
        assert!(plan.step(plan.len() + 1).is_none());
        assert!(plan.step(0).is_none());
    }

    #[test]
    fn test_plan_interpolates_and_ends_on_target() {
        // Default state: brightness 100, color mode.
        let target = TransitionTarget::new().brightness(1).color_temperature(4000);
        let plan = TransitionPlan::build(&BulbState::default(), &target, 250_000).unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(
            values(&plan, |c| c.get_brightness().map(u16::from)),
            vec![67, 34, 1]
        );
        assert_eq!(
            values(&plan, LightStateChange::get_color_temperature),
            vec![3000, 3500, 4000]
        );
        assert_eq!(
            plan.steps()
                .map(|s| s.change.get_transition_period())
                .collect::<Vec<_>>(),
            vec![Some(100_000), Some(100_000), Some(50_000)]
        );
    }

    #[test]
    fn test_plan_clamps_targets() {
        let target = TransitionTarget::new().hue(400).saturation(-5).brightness(0);
        let plan = TransitionPlan::build(&BulbState::default(), &target, 7).unwrap();
        let last = plan.step(plan.len()).unwrap().change;
        assert_eq!(last.get_hue(), Some(360));
        assert_eq!(last.get_saturation(), Some(0));
        assert_eq!(last.get_brightness(), Some(1));

        let target = TransitionTarget::new().color_temperature(20_000);
        let plan = TransitionPlan::build(&BulbState::default(), &target, 0).unwrap();
        assert_eq!(plan.durations().collect::<Vec<_>>(), vec![0]);
        assert_eq!(plan.step(1).unwrap().change.get_color_temperature(), Some(9000));
    }

    #[test]
    fn test_plan_rejects_bad_targets() {
        let state = BulbState::default();
        let mixed = TransitionTarget::new().hue(10).color_temperature(3000);
        assert!(TransitionPlan::build(&state, &mixed, 1000).unwrap_err().is_validation());
        assert!(
            TransitionPlan::build(&state, &TransitionTarget::new(), 1000)
                .unwrap_err()
                .is_validation()
        );
        let target = TransitionTarget::new().brightness(5);
        assert!(
            TransitionPlan::with_max_step(&state, &target, 1000, 0)
                .unwrap_err()
                .is_validation()
        );
    }

    #[test]
    fn test_target_deserializes_partial() {
        let target: TransitionTarget = serde_json::from_value(json!({"brightness": 80})).unwrap();
        assert_eq!(target, TransitionTarget::new().brightness(80));
        assert_eq!(serde_json::to_value(target).unwrap(), json!({"brightness": 80}));
    }

    #[cfg(feature = "runtime-tokio")]
    #[tokio::test(start_paused = true)]
    async fn test_run_switches_on_and_waits_each_step() {
        let transport = MockTransport::with_light_state(json!({
            "on_off": 0,
            "dft_on_state": {
                "mode": "normal", "hue": 0, "saturation": 0, "color_temp": 2700, "brightness": 40,
            },
        }));
        let requests = transport.requests();
        let mut bulb = Bulb::with_transport(Ipv4Addr::LOCALHOST, transport)
            .await
            .unwrap();

        let started = tokio::time::Instant::now();
        let target = TransitionTarget::new().brightness(90).color_temperature(3600);
        bulb.long_transition(&target, 250_000).await.unwrap();
        assert!(started.elapsed() >= std::time::Duration::from_millis(250_000));

        let sent = requests.transitions();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0]["on_off"], 1);
        assert!(sent[1].get("on_off").is_none());
        assert!(sent[2].get("on_off").is_none());
        let periods: Vec<_> = sent.iter().map(|s| s["transition_period"].clone()).collect();
        assert_eq!(periods, vec![json!(100_000), json!(100_000), json!(50_000)]);
        assert_eq!(sent[2]["brightness"], 90);
        assert_eq!(sent[2]["color_temp"], 3600);

        assert!(bulb.state().is_on());
        assert_eq!(bulb.state().brightness().value(), 90);
        assert_eq!(bulb.state().color_temperature().kelvin(), 3600);
        assert_eq!(bulb.state().transition_period().millis(), 50_000);
    }

    #[cfg(feature = "runtime-tokio")]
    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_first_failure() {
        let transitions = Arc::new(AtomicUsize::new(0));
        let counter = transitions.clone();
        let light_state = default_light_state();
        let transport = MockTransport::responding(move |command| {
            if command["smartlife.iot.smartbulb.lightingservice"]
                .get("transition_light_state")
                .is_some()
                && counter.fetch_add(1, Ordering::SeqCst) == 1
            {
                return Err(Error::Timeout { attempts: 5 });
            }
            Ok(reply(command, &light_state))
        });
        let requests = transport.requests();
        let mut bulb = Bulb::with_transport(Ipv4Addr::LOCALHOST, transport)
            .await
            .unwrap();

        let target = TransitionTarget::new().brightness(100);
        let err = bulb.long_transition(&target, 300_000).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 5 }));
        assert_eq!(requests.transitions().len(), 2);
        // First step (50 -> 67) stays applied.
        assert_eq!(bulb.state().brightness().value(), 67);
    }

    #[tokio::test]
    async fn test_run_validates_before_sending() {
        let transport = MockTransport::new();
        let requests = transport.requests();
        let mut bulb = Bulb::with_transport(Ipv4Addr::LOCALHOST, transport)
            .await
            .unwrap();
        requests.clear();

        let target = TransitionTarget::new().saturation(50).color_temperature(5000);
        assert!(bulb.long_transition(&target, 1_000).await.unwrap_err().is_validation());
        assert_eq!(requests.len(), 0);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            TransitionPhase::Executing { step: 2, of: 5 }.to_string(),
            "executing step 2 of 5"
        );
    }
}
