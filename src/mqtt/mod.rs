//! MQTT 3.1.1 client for devices with a single byte-stream connection.
//!
//! # Layout
//!
//! - [`varint`]: remaining-length encoding
//! - [`packet`]: control packet codec over one fixed buffer
//! - [`MessageIds`]: packet identifier allocation
//! - [`Client`]: connection lifecycle, QoS handshakes and the poll loop
//! - [`KeepAlive`]: ping scheduling driven by timer ticks
//! - [`Session`]: in-flight QoS 1/2 bookkeeping
//! - [`Settings`], [`Options`] and [`Config`]: configuration
//!
//! # Quality of service
//!
//! | QoS | Outbound                              | Inbound                          |
//! |-----|---------------------------------------|----------------------------------|
//! | 0   | sent once, no ID                      | delivered                        |
//! | 1   | in flight until PUBACK                | PUBACK, then delivered           |
//! | 2   | PUBREC answered with PUBREL, PUBCOMP  | PUBREC, then delivered once;     |
//! |     | retires it                            | PUBREL answered with PUBCOMP     |

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod keep_alive;
pub mod message;
pub mod options;
pub mod packet;
pub mod session;
pub mod varint;

pub use client::{Client, DEFAULT_BUFFER_SIZE, State};
pub use config::Config;
pub use error::Error;
pub use id::MessageIds;
pub use keep_alive::{KeepAlive, KeepAliveAction};
pub use message::{Event, Handler, Message};
pub use options::{ConnectReturnCode, Options, QoS, Settings, User, Will};
pub use session::Session;
