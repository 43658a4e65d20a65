//! Individual bulb control.

use std::fmt;
use std::net::Ipv4Addr;

use chrono::NaiveDateTime;
use log::debug;
use serde_json::{Value, json};

use crate::change::LightStateChange;
use crate::command::{Command, DeviceTime, TimezoneReply};
use crate::errors::Error;
use crate::history::{MessageHistory, MessageType};
use crate::identity::{DeviceIdentity, LightDetails};
use crate::operation::{Field, FieldValue};
use crate::runtime::{self, Instant};
use crate::state::{BulbState, SysInfo};
use crate::transition::{self, TransitionTarget};
use crate::transport::{Transport, TransportConfig, UdpTransport};
use crate::types::{Brightness, Mode, PowerMode, TimezoneIndex, TransitionPeriod};

type Result<T> = std::result::Result<T, Error>;

/// A connected TP-Link smart bulb and its cached state.
///
/// Construction queries the bulb, so a `Bulb` always starts from the
/// device's real state. Commands that change the bulb take `&mut self`: the
/// cache is only updated once the bulb confirms the command.
///
/// # Example
///
/// ```ignore
/// use tplight_rs::{Bulb, LightStateChange};
///
/// let mut bulb = Bulb::connect("192.168.1.60").await?;
/// let mut change = LightStateChange::new();
/// change.brightness(40).color_temperature(2700).transition_period(2000);
/// bulb.apply(&change, true).await?;
/// ```
pub struct Bulb<T: Transport = UdpTransport> {
    ip: Ipv4Addr,
    transport: T,
    state: BulbState,
    identity: DeviceIdentity,
    force_refresh: bool,
    history: MessageHistory,
}

impl Bulb<UdpTransport> {
    /// Connect to the bulb at a dotted-quad IPv4 address with the default transport settings.
    pub async fn connect(address: &str) -> Result<Self> {
        Self::connect_with(address, TransportConfig::default()).await
    }

    pub async fn connect_with(address: &str, config: TransportConfig) -> Result<Self> {
        let ip: Ipv4Addr = address
            .trim()
            .parse()
            .map_err(|_| Error::InvalidAddress(address.to_string()))?;
        Bulb::with_transport(ip, UdpTransport::new(ip, config)).await
    }
}

impl<T: Transport> Bulb<T> {
    /// Set up a bulb over any [`Transport`], reading its state and light details.
    pub async fn with_transport(ip: Ipv4Addr, transport: T) -> Result<Self> {
        let mut bulb = Bulb {
            ip,
            transport,
            state: BulbState::default(),
            identity: DeviceIdentity::default(),
            force_refresh: false,
            history: MessageHistory::new(),
        };

        bulb.load_identity()
            .await
            .map_err(|e| Error::Construction(Box::new(e)))?;
        Ok(bulb)
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// Last known state, without querying the bulb.
    pub fn state(&self) -> &BulbState {
        &self.state
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Cached alias; refreshed by every state query.
    pub fn alias(&self) -> &str {
        &self.identity.alias
    }

    /// When set, [`Bulb::get`] queries the bulb before answering.
    pub fn set_force_refresh(&mut self, force: bool) {
        self.force_refresh = force;
    }

    pub fn force_refresh(&self) -> bool {
        self.force_refresh
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Query the bulb and replace the cached state with its answer.
    pub async fn refresh(&mut self) -> Result<BulbState> {
        self.query_sysinfo().await?;
        Ok(self.state.clone())
    }

    /// Query the bulb and return the raw `get_sysinfo` response.
    pub async fn status(&mut self) -> Result<Value> {
        let command = Command::get_sysinfo();
        let response = self.send_command(&command).await?;
        let sysinfo: SysInfo = command.parse(&response)?;
        self.absorb_sysinfo(&sysinfo)?;
        Ok(response)
    }

    /// Raw `get_light_details` result.
    pub async fn light_details(&mut self) -> Result<Value> {
        let command = Command::get_light_details();
        let response = self.send_command(&command).await?;
        command.result(&response).cloned()
    }

    /// Read one field, from the cache or, in force-refresh mode, from the bulb.
    pub async fn get(&mut self, field: Field) -> Result<FieldValue> {
        if self.force_refresh {
            self.query_sysinfo().await?;
        }
        Ok(match field {
            Field::Power => FieldValue::Power(self.state.is_on()),
            Field::Hue => FieldValue::Hue(self.state.hue()),
            Field::Saturation => FieldValue::Saturation(self.state.saturation()),
            Field::Brightness => FieldValue::Brightness(self.state.brightness()),
            Field::ColorTemperature => FieldValue::ColorTemperature(self.state.color_temperature()),
            Field::Mode => FieldValue::Mode(self.state.mode()),
            Field::TransitionPeriod => FieldValue::TransitionPeriod(self.state.transition_period()),
            Field::Alias => FieldValue::Alias(self.identity.alias.clone()),
        })
    }

    /// Apply a set of field changes in one command.
    ///
    /// The change is validated before anything is sent. The command fades
    /// over the change's transition period if it names one (which then
    /// becomes the cached period), otherwise over the cached period. With
    /// `synchronous`, returns only once that period has elapsed since the
    /// request went out.
    pub async fn apply(&mut self, change: &LightStateChange, synchronous: bool) -> Result<()> {
        let checked = change.validate()?;
        let period = checked
            .transition_period
            .and_then(TransitionPeriod::create)
            .unwrap_or_else(|| self.state.transition_period());

        if checked.is_empty() {
            self.state.set_transition_period(period);
            return Ok(());
        }

        let command = Command::transition_light_state(&checked, period)?;
        let started = Instant::now();
        self.send_command(&command).await?;
        self.state.update_from_change(&checked);
        self.state.set_transition_period(period);

        if synchronous {
            let remaining = period.as_duration().saturating_sub(started.elapsed());
            debug!("{} waiting {:?} for transition", self.ip, remaining);
            runtime::sleep(remaining).await;
        }
        Ok(())
    }

    /// `change` with a power-on request folded in if the bulb is believed to
    /// be off and the change does not set power itself.
    pub fn with_power_on_if_off(&self, change: &LightStateChange) -> LightStateChange {
        let mut folded = change.clone();
        if !self.state.is_on() && folded.on_off.is_none() {
            folded.power(true);
        }
        folded
    }

    pub async fn set_hue(&mut self, hue: u16) -> Result<()> {
        self.apply(LightStateChange::new().hue(hue), false).await
    }

    pub async fn set_saturation(&mut self, saturation: u8) -> Result<()> {
        self.apply(LightStateChange::new().saturation(saturation), false)
            .await
    }

    pub async fn set_brightness(&mut self, brightness: u8) -> Result<()> {
        self.apply(LightStateChange::new().brightness(brightness), false)
            .await
    }

    pub async fn set_color_temperature(&mut self, kelvin: u16) -> Result<()> {
        self.apply(LightStateChange::new().color_temperature(kelvin), false)
            .await
    }

    pub async fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.apply(LightStateChange::new().mode(mode), false).await
    }

    /// Hue, saturation and brightness in one fade.
    pub async fn set_hsb(&mut self, hue: u16, saturation: u8, brightness: u8) -> Result<()> {
        let mut change = LightStateChange::new();
        change.hue(hue).saturation(saturation).brightness(brightness);
        self.apply(&change, false).await
    }

    /// Move the brightness by `offset` from its cached value, stopping at 1 and 100.
    pub async fn offset_brightness(&mut self, offset: i16) -> Result<()> {
        let current = i64::from(self.state.brightness().value());
        let brightness = Brightness::clamped(current + i64::from(offset));
        self.set_brightness(brightness.value()).await
    }

    /// Fade the brightness by `diff` and back again, each leg taking
    /// `period_ms`. The cached transition period is left unchanged.
    pub async fn pulse(&mut self, period_ms: u32, diff: i16) -> Result<()> {
        let period = self.state.transition_period();
        let start = self.state.brightness().value();
        let peak = Brightness::clamped(i64::from(start) + i64::from(diff));

        let mut change = LightStateChange::new();
        change.brightness(peak.value()).transition_period(period_ms);
        self.apply(&change, true).await?;
        change.brightness(start);
        self.apply(&change, true).await?;

        self.state.set_transition_period(period);
        Ok(())
    }

    /// Change the fade duration used by later commands. Sends nothing.
    pub fn set_transition_period(&mut self, millis: u32) -> Result<()> {
        let period = TransitionPeriod::create(millis).ok_or_else(|| {
            Error::validation(
                "transition_period",
                format!("{millis} is outside 0..={}", TransitionPeriod::MAX),
            )
        })?;
        self.state.set_transition_period(period);
        Ok(())
    }

    pub async fn on(&mut self) -> Result<()> {
        self.apply(LightStateChange::new().power(true), false).await
    }

    pub async fn off(&mut self) -> Result<()> {
        self.apply(LightStateChange::new().power(false), false).await
    }

    pub async fn set_power(&mut self, power: PowerMode) -> Result<()> {
        match power {
            PowerMode::On => self.on().await,
            PowerMode::Off => self.off().await,
            PowerMode::Reboot => self.reboot().await,
        }
    }

    /// Query whether the bulb is on, refreshing the cache.
    pub async fn is_on(&mut self) -> Result<bool> {
        self.query_sysinfo().await?;
        Ok(self.state.is_on())
    }

    /// Switch the bulb to the opposite of its live power state.
    pub async fn toggle(&mut self) -> Result<()> {
        if self.is_on().await? {
            self.off().await
        } else {
            self.on().await
        }
    }

    pub async fn reboot(&mut self) -> Result<()> {
        self.send_command(&Command::reboot(1)).await?;
        Ok(())
    }

    pub async fn set_alias(&mut self, alias: &str) -> Result<()> {
        self.send_command(&Command::set_alias(alias)).await?;
        self.identity.alias = alias.to_string();
        Ok(())
    }

    /// The bulb's local clock.
    pub async fn time(&mut self) -> Result<NaiveDateTime> {
        let command = Command::get_time();
        let response = self.send_command(&command).await?;
        let time: DeviceTime = command.parse(&response)?;
        NaiveDateTime::try_from(time)
    }

    pub async fn set_time(&mut self, time: &NaiveDateTime) -> Result<()> {
        self.send_command(&Command::set_time(time)?).await?;
        Ok(())
    }

    pub async fn timezone(&mut self) -> Result<TimezoneIndex> {
        let command = Command::get_timezone();
        let response = self.send_command(&command).await?;
        let reply: TimezoneReply = command.parse(&response)?;
        TimezoneIndex::create(reply.index).ok_or_else(|| {
            Error::MalformedResponse(format!("timezone index {} out of range", reply.index))
        })
    }

    /// Set the timezone by firmware table index (0-109), keeping the bulb's clock.
    pub async fn set_timezone(&mut self, index: u8) -> Result<()> {
        let index = TimezoneIndex::create(index).ok_or_else(|| {
            Error::validation(
                "timezone",
                format!("{index} is outside 0..={}", TimezoneIndex::MAX),
            )
        })?;
        let now = self.time().await?;
        self.send_command(&Command::set_timezone(index, &now)?)
            .await?;
        Ok(())
    }

    /// Fade to `target` over `duration_ms`, splitting the fade into steps
    /// the firmware can perform. See [`transition::run`].
    pub async fn long_transition(
        &mut self,
        target: &TransitionTarget,
        duration_ms: u64,
    ) -> Result<()> {
        transition::run(self, target, duration_ms).await
    }

    /// Snapshot of everything known about the bulb, for diagnostics.
    pub fn diagnostics(&self) -> Value {
        json!({
            "ip": self.ip.to_string(),
            "state": self.state,
            "identity": self.identity,
            "force_refresh": self.force_refresh,
            "history": self.history.summary(),
        })
    }

    async fn load_identity(&mut self) -> Result<()> {
        let sysinfo = self.query_sysinfo().await?;
        let command = Command::get_light_details();
        let response = self.send_command(&command).await?;
        let details: LightDetails = command.parse(&response)?;
        self.identity = DeviceIdentity::new(&sysinfo, &details);
        Ok(())
    }

    async fn query_sysinfo(&mut self) -> Result<SysInfo> {
        let command = Command::get_sysinfo();
        let response = self.send_command(&command).await?;
        let sysinfo: SysInfo = command.parse(&response)?;
        self.absorb_sysinfo(&sysinfo)?;
        Ok(sysinfo)
    }

    fn absorb_sysinfo(&mut self, sysinfo: &SysInfo) -> Result<()> {
        self.state.update_from_report(&sysinfo.light_state)?;
        self.identity.alias.clone_from(&sysinfo.alias);
        self.identity.device_id.clone_from(&sysinfo.device_id);
        Ok(())
    }

    async fn send_command(&mut self, command: &Command) -> Result<Value> {
        let msg = command.to_value();
        self.history.record(MessageType::Send, &msg);

        match self.transport.request(&msg).await {
            Ok(response) => {
                self.history.record(MessageType::Receive, &response);
                Ok(response)
            }
            Err(e) => {
                self.history.record_error(&e.to_string());
                Err(e)
            }
        }
    }
}

impl<T: Transport> fmt::Debug for Bulb<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bulb")
            .field("ip", &self.ip)
            .field("state", &self.state)
            .field("identity", &self.identity)
            .field("force_refresh", &self.force_refresh)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> fmt::Display for Bulb<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.state;
        write!(
            f,
            "<{} {} {} transition_period:{} hue:{} saturation:{} brightness:{} color_temp:{}>",
            self.identity.alias,
            self.ip,
            if s.is_on() { "ON" } else { "OFF" },
            s.transition_period().millis(),
            s.hue().value(),
            s.saturation().value(),
            s.brightness().value(),
            s.color_temperature().kelvin(),
        )
    }
}
