//! Inbound messages and acknowledgement events delivered to the application.

use super::options::QoS;

/// An inbound application message.
///
/// Topic and payload borrow the client's packet buffer and are only valid
/// for the duration of the handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'a> {
    /// Topic the message was published on.
    pub topic: &'a str,
    /// Application payload.
    pub payload: &'a [u8],
    /// Message ID, `0` for QoS 0.
    pub id: u16,
    /// Delivery QoS.
    pub qos: QoS,
    /// Set when the broker is re-delivering.
    pub dup: bool,
    /// Set for retained messages.
    pub retain: bool,
}

/// Acknowledgements and responses that need no automatic reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A QoS 1 publish was acknowledged.
    PubAck(u16),
    /// A QoS 2 publish completed.
    PubComp(u16),
    /// A subscription was answered. `granted` is `None` when the broker
    /// refused it (return code `0x80`).
    SubAck {
        /// Message ID of the SUBSCRIBE.
        id: u16,
        /// Maximum QoS the broker granted.
        granted: Option<QoS>,
    },
    /// An unsubscription was acknowledged.
    UnsubAck(u16),
    /// The broker answered a keep-alive ping.
    PingResp,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Event::PubAck(id) => defmt::write!(f, "PubAck({})", id),
            Event::PubComp(id) => defmt::write!(f, "PubComp({})", id),
            Event::SubAck { id, granted } => {
                defmt::write!(f, "SubAck({}, {})", id, granted)
            }
            Event::UnsubAck(id) => defmt::write!(f, "UnsubAck({})", id),
            Event::PingResp => defmt::write!(f, "PingResp"),
        }
    }
}

/// Receives what [`Client::poll`](super::Client::poll) decodes.
///
/// Any `FnMut(&Message)` closure or function is a handler that ignores
/// events.
///
/// # Examples
///
/// ```rust
/// use libmqtt::mqtt::{Event, Handler, Message};
///
/// #[derive(Default)]
/// struct Counter {
///     messages: usize,
///     acks: usize,
/// }
///
/// impl Handler for Counter {
///     fn on_message(&mut self, _message: &Message<'_>) {
///         self.messages += 1;
///     }
///
///     fn on_event(&mut self, event: Event) {
///         if let Event::PubAck(_) | Event::PubComp(_) = event {
///             self.acks += 1;
///         }
///     }
/// }
/// ```
pub trait Handler {
    /// Called for every inbound PUBLISH, after its acknowledgement was sent.
    fn on_message(&mut self, message: &Message<'_>);

    /// Called for acknowledgements and ping responses.
    fn on_event(&mut self, event: Event) {
        let _ = event;
    }
}

impl<F> Handler for F
where
    F: FnMut(&Message<'_>),
{
    fn on_message(&mut self, message: &Message<'_>) {
        self(message)
    }
}
