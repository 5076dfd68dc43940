//! DHT11 / DHT22 Sensor Driver for Embedded Rust
//!
//! This crate decodes the single-wire protocol of the DHT11 and DHT22 (AM2302)
//! temperature and humidity sensors from timestamped line edges. The host pulls
//! the data line low to request a reading; the sensor answers with 86 edges
//! whose high-pulse widths encode 40 bits: two humidity bytes, two temperature
//! bytes and a checksum.
//!
//! # Features
//! - Edge-timing decoder: bits are recovered from the time between edges, so
//!   edge delivery latency does not matter as long as no edge is lost
//! - One driver for both models, parameterised by [`SensorProfile`]
//! - Read throttling and bounded retry
//! - Outlier-trimmed sampling over several reads
//! - Designed for `no_std` environments (needs `alloc` for sampling)
//!
//! # Dependencies
//! The data line is reached through the [`EdgeLine`] trait, which an edge
//! interrupt or GPIO event subsystem implements. Blocking waits use
//! [`DelayNs`].
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs through `defmt`
//! - `log`: Logs through the `log` facade
//!
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod fmt;

pub mod config;
pub mod decoder;
pub mod dhtxx;
pub mod error;
pub mod frame;
pub mod line;
mod sampler;

#[cfg(test)]
mod testing;

pub use config::{Encoding, SensorProfile, Settings};
pub use decoder::{DecodeSession, Outcome};
pub use dhtxx::Dht;
pub use error::DhtError;
pub use frame::{Frame, Reading};
pub use line::{EdgeEvent, EdgeHandler, EdgeLine, PinMode};
