//! Connection parameters: broker settings, per-connect options, Will and
//! credentials, plus the enums shared with the wire format.

use super::error::Error;
use heapless::String;

/// Keep-alive interval used when none is configured, in seconds.
pub const DEFAULT_KEEP_ALIVE: u16 = 10;

/// Standard unencrypted MQTT port.
pub const DEFAULT_PORT: u16 = 1883;

/// Per-byte read timeout used when none is configured, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 1_000;

/// Retransmission interval for unacknowledged publishes, in milliseconds.
pub const DEFAULT_RETRY_INTERVAL_MS: u32 = 10_000;

/// Longest broker host name accepted by [`Settings`].
pub const MAX_HOST_LEN: usize = 64;

/// Quality of Service levels for MQTT messages.
///
/// # Examples
///
/// ```rust
/// use libmqtt::mqtt::QoS;
///
/// assert_eq!(QoS::AtMostOnce as u8, 0);
/// assert_eq!(QoS::try_from(2), Ok(QoS::ExactlyOnce));
/// assert!(QoS::try_from(3).is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum QoS {
    /// At most once delivery. No acknowledgement, no message ID.
    #[default]
    AtMostOnce = 0,
    /// At least once delivery. Acknowledged with PUBACK.
    AtLeastOnce = 1,
    /// Exactly once delivery. PUBREC, PUBREL, PUBCOMP handshake.
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(Error::InvalidParameter),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for QoS {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "QoS{}", *self as u8)
    }
}

/// The broker's answer to CONNECT, taken from CONNACK.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConnectReturnCode {
    /// Connection accepted.
    Accepted = 0,
    /// The broker does not support protocol level 4.
    UnacceptableProtocol = 1,
    /// The client identifier is not allowed by the broker.
    IdRejected = 2,
    /// The network connection works but the MQTT service is unavailable.
    ServerUnavailable = 3,
    /// The user name or password is malformed.
    BadCredentials = 4,
    /// The client is not authorized to connect.
    NotAuthorized = 5,
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ConnectReturnCode::Accepted),
            1 => Ok(ConnectReturnCode::UnacceptableProtocol),
            2 => Ok(ConnectReturnCode::IdRejected),
            3 => Ok(ConnectReturnCode::ServerUnavailable),
            4 => Ok(ConnectReturnCode::BadCredentials),
            5 => Ok(ConnectReturnCode::NotAuthorized),
            _ => Err(Error::TransmissionError),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConnectReturnCode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConnectReturnCode::Accepted => defmt::write!(f, "Accepted"),
            ConnectReturnCode::UnacceptableProtocol => defmt::write!(f, "UnacceptableProtocol"),
            ConnectReturnCode::IdRejected => defmt::write!(f, "IdRejected"),
            ConnectReturnCode::ServerUnavailable => defmt::write!(f, "ServerUnavailable"),
            ConnectReturnCode::BadCredentials => defmt::write!(f, "BadCredentials"),
            ConnectReturnCode::NotAuthorized => defmt::write!(f, "NotAuthorized"),
        }
    }
}

/// Message the broker publishes on the client's behalf if the connection
/// drops without a DISCONNECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Will<'a> {
    /// Topic of the Will message. Must not be empty.
    pub topic: &'a str,
    /// Will payload. Must not be empty.
    pub message: &'a [u8],
    /// QoS the broker uses when publishing the Will.
    pub qos: QoS,
    /// Whether the broker retains the Will message.
    pub retain: bool,
}

/// Credentials sent in the CONNECT payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User<'a> {
    /// User name. Must not be empty.
    pub name: &'a str,
    /// Optional password, at most 65 535 bytes.
    pub password: Option<&'a [u8]>,
}

/// Per-connect options.
///
/// # Examples
///
/// ```rust
/// use libmqtt::mqtt::{Options, QoS, Will};
///
/// let options = Options::new("Argon").with_will(Will {
///     topic: "/help",
///     message: b"Help me!",
///     qos: QoS::AtMostOnce,
///     retain: false,
/// });
///
/// assert_eq!(options.connect_flags(), 0x06);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options<'a> {
    /// The client identifier, unique per broker. Must not be empty.
    pub client_id: &'a str,
    /// Discard any previous session state on the broker.
    pub clean_session: bool,
    /// Optional Will message.
    pub will: Option<Will<'a>>,
    /// Optional credentials.
    pub user: Option<User<'a>>,
}

impl<'a> Options<'a> {
    /// Options for `client_id` with a clean session, no Will and no credentials.
    pub const fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            clean_session: true,
            will: None,
            user: None,
        }
    }

    /// Set the clean-session flag.
    pub const fn clean_session(mut self, clean_session: bool) -> Self {
        self.clean_session = clean_session;
        self
    }

    /// Attach a Will message.
    pub const fn with_will(mut self, will: Will<'a>) -> Self {
        self.will = Some(will);
        self
    }

    /// Attach credentials.
    pub const fn with_user(mut self, user: User<'a>) -> Self {
        self.user = Some(user);
        self
    }

    /// Check the options before anything is sent.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if the client ID is empty, a Will lacks a
    /// topic or message, credentials lack a name, or the password is longer
    /// than 65 535 bytes.
    pub fn validate(&self) -> Result<(), Error> {
        if self.client_id.is_empty() {
            return Err(Error::InvalidParameter);
        }
        if let Some(will) = &self.will {
            if will.topic.is_empty() || will.message.is_empty() {
                return Err(Error::InvalidParameter);
            }
        }
        if let Some(user) = &self.user {
            if user.name.is_empty() {
                return Err(Error::InvalidParameter);
            }
            if user.password.is_some_and(|p| p.len() > usize::from(u16::MAX)) {
                return Err(Error::InvalidParameter);
            }
        }
        Ok(())
    }

    /// The CONNECT flags byte.
    ///
    /// Bit 1 clean session, bit 2 Will present, bits 3-4 Will QoS, bit 5 Will
    /// retain, bit 6 password present, bit 7 user name present.
    pub fn connect_flags(&self) -> u8 {
        let mut flags = 0;
        if self.clean_session {
            flags |= 0x02;
        }
        if let Some(will) = &self.will {
            flags |= 0x04 | ((will.qos as u8) << 3);
            if will.retain {
                flags |= 0x20;
            }
        }
        if let Some(user) = &self.user {
            flags |= 0x80;
            if user.password.is_some() {
                flags |= 0x40;
            }
        }
        flags
    }
}

/// Broker address and client-wide timing.
///
/// Changes take effect on the next `connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Broker host name or IP address.
    pub host: String<MAX_HOST_LEN>,
    /// Broker port.
    pub port: u16,
    /// Keep-alive interval in seconds. `0` disables the keep-alive scheduler.
    ///
    /// Also bounds how long `connect` waits for CONNACK.
    pub keep_alive_seconds: u16,
    /// How long to wait for each further byte once a packet has started.
    pub read_timeout_ms: u32,
    /// Idle time before an unacknowledged publish is re-sent. `0` disables
    /// retransmission.
    pub retry_interval_ms: u32,
}

impl Settings {
    /// Settings for `host:port` with default timing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `host` is longer than [`MAX_HOST_LEN`].
    pub fn new(host: &str, port: u16) -> Result<Self, Error> {
        Ok(Self {
            host: String::try_from(host).map_err(|_| Error::InvalidParameter)?,
            port,
            ..Self::default()
        })
    }

    /// Milliseconds to wait for CONNACK.
    pub(crate) fn connect_timeout_ms(&self) -> u64 {
        let seconds = if self.keep_alive_seconds == 0 {
            DEFAULT_KEEP_ALIVE
        } else {
            self.keep_alive_seconds
        };
        u64::from(seconds) * 1_000
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}
