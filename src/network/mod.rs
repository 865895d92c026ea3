//! Byte-stream transport abstraction.
//!
//! The MQTT client never touches sockets directly. It drives a [`Connect`]
//! implementation to open a [`Connection`] to the broker and then moves bytes
//! through the [`Read`] and [`Write`] halves of that connection. Any TCP stack
//! (smoltcp, an AT-command modem, `std::net`) can be plugged in by implementing
//! these traits.
//!
//! Reads are non-blocking: `Ok(0)` means that no byte is available right now.
//! The client bounds every wait with its own timer and yields between
//! attempts, so a transport must never block indefinitely inside `read`.

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// `std::net` TCP transport
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read whatever is available without blocking; `Ok(0)` when nothing is.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection, returning the number of bytes accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// An open byte stream to the broker.
pub trait Connection: Read + Write + Close {
    /// Whether the peer is still reachable.
    ///
    /// Transports that cannot detect a dropped peer may keep the default.
    fn is_open(&self) -> bool {
        true
    }
}

/// Opens connections to a broker.
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `host:port`
    fn connect(&mut self, host: &str, port: u16) -> Result<Self::Connection, Self::Error>;
}
