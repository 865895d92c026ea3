//! JSON client configuration.
//!
//! Devices usually ship their broker address and identity as a small JSON
//! blob in flash. [`Config`] parses such a blob without allocating: every
//! string borrows the input, so the input must not contain escape
//! sequences.
//!
//! ```json
//! {
//!     "host": "broker.local",
//!     "port": 1883,
//!     "keep_alive": 30,
//!     "client_id": "Argon",
//!     "will": { "topic": "/help", "message": "Help me!" },
//!     "user": { "name": "device", "password": "c2VjcmV0" }
//! }
//! ```
//!
//! The password is base64-encoded so arbitrary bytes survive the JSON
//! round trip.

use base64ct::{Base64, Encoding};
use serde::Deserialize;

use super::error::Error;
use super::options::{
    DEFAULT_KEEP_ALIVE, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_MS, DEFAULT_RETRY_INTERVAL_MS, Options,
    QoS, Settings, User, Will,
};

/// Will section of a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WillConfig<'a> {
    /// Will topic.
    pub topic: &'a str,
    /// Will message text.
    pub message: &'a str,
    /// Will QoS, 0 to 2.
    #[serde(default)]
    pub qos: u8,
    /// Will retain flag.
    #[serde(default)]
    pub retain: bool,
}

/// Credentials section of a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UserConfig<'a> {
    /// User name.
    pub name: &'a str,
    /// Base64-encoded password.
    #[serde(default, borrow)]
    pub password: Option<&'a str>,
}

/// A parsed configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Config<'a> {
    /// Broker host name or IP address.
    pub host: &'a str,
    /// Broker port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u16,
    /// Client identifier.
    pub client_id: &'a str,
    /// Clean-session flag.
    #[serde(default = "default_clean_session")]
    pub clean_session: bool,
    /// Optional Will message.
    #[serde(default, borrow)]
    pub will: Option<WillConfig<'a>>,
    /// Optional credentials.
    #[serde(default, borrow)]
    pub user: Option<UserConfig<'a>>,
    /// Per-byte read timeout in milliseconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u32,
    /// Retransmission interval in milliseconds.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u32,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_keep_alive() -> u16 {
    DEFAULT_KEEP_ALIVE
}

fn default_clean_session() -> bool {
    true
}

fn default_read_timeout() -> u32 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_retry_interval() -> u32 {
    DEFAULT_RETRY_INTERVAL_MS
}

impl<'a> Config<'a> {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if the document is not valid JSON or a
    /// required field is missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use libmqtt::mqtt::Config;
    ///
    /// let config = Config::from_json(r#"{"host":"10.0.0.2","client_id":"Argon"}"#).unwrap();
    /// assert_eq!(config.port, 1883);
    /// assert!(config.clean_session);
    /// ```
    pub fn from_json(json: &'a str) -> Result<Self, Error> {
        let (config, _) = serde_json_core::from_str::<Config<'a>>(json).map_err(|_e| {
            error!("invalid configuration");
            Error::InvalidParameter
        })?;
        Ok(config)
    }

    /// Broker address and timing.
    pub fn settings(&self) -> Result<Settings, Error> {
        let mut settings = Settings::new(self.host, self.port)?;
        settings.keep_alive_seconds = self.keep_alive;
        settings.read_timeout_ms = self.read_timeout_ms;
        settings.retry_interval_ms = self.retry_interval_ms;
        Ok(settings)
    }

    /// Connect options. The password, if any, is decoded into
    /// `password_buf`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a Will QoS above 2, a password that
    /// is not valid base64, or a `password_buf` too small to hold it.
    pub fn options<'b>(&'b self, password_buf: &'b mut [u8]) -> Result<Options<'b>, Error> {
        let mut options = Options::new(self.client_id).clean_session(self.clean_session);
        if let Some(will) = &self.will {
            options = options.with_will(Will {
                topic: will.topic,
                message: will.message.as_bytes(),
                qos: QoS::try_from(will.qos)?,
                retain: will.retain,
            });
        }
        if let Some(user) = &self.user {
            let password = match user.password {
                Some(encoded) => Some(
                    &*Base64::decode(encoded, password_buf).map_err(|_| Error::InvalidParameter)?,
                ),
                None => None,
            };
            options = options.with_user(User {
                name: user.name,
                password,
            });
        }
        Ok(options)
    }
}
