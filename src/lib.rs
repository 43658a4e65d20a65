//! # tplight_rs
//!
//! An async Rust library for controlling TP-Link LB1xx smart bulbs over the
//! local UDP protocol.
//!
//! This crate provides a **runtime-agnostic** async API to talk to bulbs on
//! your local network: power, hue, saturation, brightness, color temperature,
//! mode, alias, clock and timezone, plus fades longer than the firmware's own
//! transition limit.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tplight_rs::{Bulb, LightStateChange, TransitionTarget};
//!
//! async fn wake_up() -> Result<(), tplight_rs::Error> {
//!     let mut bulb = Bulb::connect("192.168.1.60").await?;
//!
//!     // Warm, dim light, faded in over two seconds
//!     let mut change = LightStateChange::new();
//!     change.power(true).brightness(5).color_temperature(2700).transition_period(2000);
//!     bulb.apply(&change, true).await?;
//!
//!     // Then slowly up to daylight over twenty minutes
//!     let target = TransitionTarget::new().brightness(80).color_temperature(5000);
//!     bulb.long_transition(&target, 20 * 60 * 1000).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Runtime Agnostic**: Works with tokio, async-std, or smol async runtimes
//! - **Validated Values**: [`Hue`], [`Saturation`], [`Brightness`] and
//!   [`ColorTemperature`] only hold values the bulb accepts; bad input fails
//!   before anything is sent
//! - **Cached State**: [`Bulb`] keeps the last confirmed [`BulbState`]
//! - **Long Transitions**: [`TransitionPlan`] splits fades of any length
//! - **Operations**: [`Operation`] lets a front end drive a bulb from decoded requests
//! - **Message History**: Every exchange is kept in a [`MessageHistory`]
//!
//! ## Communication
//!
//! Bulbs listen on UDP port 9999. Each request is a JSON object obfuscated
//! with the running XOR cipher in [`codec`]; the transport retries with a
//! growing timeout, see [`TransportConfig`].
//!
//! ## Runtime Selection
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! tplight-rs = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! tplight-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! tplight-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod bulb;
mod change;
pub mod codec;
mod command;
mod errors;
mod history;
mod identity;
mod operation;
pub mod runtime;
mod state;
pub mod transition;
mod transport;
mod types;

#[cfg(test)]
mod testing;

// Re-export public API
pub use bulb::Bulb;
pub use change::LightStateChange;
pub use command::Command;
pub use errors::Error;
pub use history::{HistoryEntry, HistorySummary, MessageHistory, MessageType};
pub use identity::DeviceIdentity;
pub use operation::{Field, FieldValue, Operation, Outcome};
pub use state::BulbState;
pub use transition::{TransitionPhase, TransitionPlan, TransitionStep, TransitionTarget};
pub use transport::{Transport, TransportConfig, UdpTransport};
pub use types::{
    Brightness, ColorTemperature, Hue, Mode, PowerMode, Saturation, TimezoneIndex,
    TransitionPeriod,
};
