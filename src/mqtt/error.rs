//! Error type shared by every MQTT operation.

/// Errors returned by the MQTT client and its codec.
///
/// All operations report failures through this enum instead of panicking.
/// None of them retry on their own; reconnect and back-off policy is left to
/// the caller.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A required argument was missing, empty or out of range.
    InvalidParameter,
    /// `connect` was called while a session is already established.
    ConnectionInUse,
    /// The operation needs an established session.
    NotConnected,
    /// The transport could not open a connection to the broker.
    ClientError,
    /// A write was short or failed, or a response was not correctly framed.
    TransmissionError,
    /// The broker did not answer within the allowed time.
    Timeout,
    /// A packet does not fit in the fixed packet buffer.
    BufferOverflow,
    /// The broker refused the session; see the stored return code.
    HostUnreachable,
    /// A remaining-length field needs more than four bytes or is truncated.
    MalformedLength,
    /// Every slot for unacknowledged QoS 1/2 publishes is taken.
    InFlightLimit,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::InvalidParameter => defmt::write!(f, "InvalidParameter"),
            Error::ConnectionInUse => defmt::write!(f, "ConnectionInUse"),
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::ClientError => defmt::write!(f, "ClientError"),
            Error::TransmissionError => defmt::write!(f, "TransmissionError"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            Error::HostUnreachable => defmt::write!(f, "HostUnreachable"),
            Error::MalformedLength => defmt::write!(f, "MalformedLength"),
            Error::InFlightLimit => defmt::write!(f, "InFlightLimit"),
        }
    }
}
