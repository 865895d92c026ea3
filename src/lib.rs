//! # libmqtt
//!
//! A small MQTT 3.1.1 client for devices that have one byte-stream
//! connection to a broker and a fixed memory budget. It runs in `no_std`
//! environments and never allocates.
//!
//! ## Features
//!
//! - CONNECT with Will and credentials, PUBLISH, SUBSCRIBE, UNSUBSCRIBE,
//!   DISCONNECT
//! - QoS 0, 1 and 2 in both directions, with in-flight tracking and DUP
//!   retransmission of unacknowledged publishes
//! - Keep-alive pings driven by a timer tick the poll loop consumes
//! - One const-generic packet buffer shared by encoding and decoding
//! - Transport and timer agnostic; `std` adapters for hosted targets
//! - JSON configuration
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libmqtt = "0.1.0"
//! ```
//!
//! ### Hosted example
//!
//! ```rust,no_run
//! # #[cfg(feature = "std")]
//! # fn main() -> Result<(), libmqtt::mqtt::Error> {
//! use libmqtt::mqtt::{Client, Message, Options, QoS, Settings};
//! use libmqtt::network::tcp::TcpConnector;
//! use libmqtt::system::timer::StdTimer;
//!
//! fn print(message: &Message<'_>) {
//!     println!("{}: {:?}", message.topic, message.payload);
//! }
//!
//! let settings = Settings::new("127.0.0.1", 1883)?;
//! let mut client: Client<_, _> = Client::new(
//!     TcpConnector,
//!     StdTimer::new(),
//!     settings,
//!     print as fn(&Message<'_>),
//! );
//!
//! client.connect(&Options::new("sensor_node_1"))?;
//! client.subscribe("sensors/#", QoS::AtLeastOnce)?;
//! client.publish("sensors/temperature", b"23.5", QoS::AtMostOnce)?;
//! loop {
//!     client.poll()?;
//! }
//! # }
//! # #[cfg(not(feature = "std"))]
//! # fn main() {}
//! ```
//!
//! ## Optional Features
//!
//! - `std`: TCP transport and thread-backed timer (default: disabled)
//! - `defmt`: log through `defmt` and derive `defmt::Format` for public enums
//! - `log`: log through the `log` facade

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Transport abstraction the client drives.
///
/// Defines the connector and connection traits a TCP stack or modem driver
/// implements, plus a `std::net` adapter behind the `std` feature.
pub mod network;

/// System collaborators: clock and periodic timer.
pub mod system;

/// The MQTT client, its codec and configuration.
pub mod mqtt;
