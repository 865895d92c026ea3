//! The MQTT 3.1.1 client.
//!
//! [`Client`] owns the transport, the timer and a single packet buffer. All
//! protocol work happens inside its methods on the caller's execution
//! context; the timer context only posts ticks that [`Client::poll`] picks
//! up.
//!
//! # Connection states
//!
//! ```text
//! Disconnected --connect()--> Connecting --CONNACK accepted--> Connected
//!      ^                          |                                |
//!      +---- refused / error -----+                                |
//!      +------------ disconnect() / keep-alive expiry -------------+
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use libmqtt::mqtt::{Client, Message, Options, QoS, Settings};
//! use libmqtt::system::timer::Timer;
//! # use libmqtt::network::{Close, Connect, Connection, Read, Write};
//! # struct Modem;
//! # struct Link;
//! # impl Connection for Link {}
//! # impl Read for Link {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> { Ok(0) }
//! # }
//! # impl Write for Link {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, ()> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), ()> { Ok(()) }
//! # }
//! # impl Close for Link {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), ()> { Ok(()) }
//! # }
//! # impl Connect for Modem {
//! #     type Connection = Link;
//! #     type Error = ();
//! #     fn connect(&mut self, _host: &str, _port: u16) -> Result<Link, ()> { Ok(Link) }
//! # }
//! # struct Clock;
//! # impl Timer for Clock {
//! #     fn now_millis(&self) -> u64 { 0 }
//! #     fn start(&mut self, _period_ms: u32) {}
//! #     fn stop(&mut self) {}
//! #     fn take_tick(&mut self) -> bool { false }
//! # }
//!
//! fn on_message(message: &Message<'_>) {
//!     let _ = (message.topic, message.payload);
//! }
//!
//! let settings = Settings::new("broker.local", 1883)?;
//! let mut client: Client<_, _> =
//!     Client::new(Modem, Clock, settings, on_message as fn(&Message<'_>));
//!
//! client.connect(&Options::new("Argon"))?;
//! client.subscribe("/test", QoS::AtMostOnce)?;
//! client.publish("/test", b"hello", QoS::AtLeastOnce)?;
//!
//! for _ in 0..100 {
//!     client.poll()?;
//! }
//! client.disconnect();
//! # Ok::<(), libmqtt::mqtt::Error>(())
//! ```

use core::fmt;

use super::error::Error;
use super::id::MessageIds;
use super::keep_alive::{KeepAlive, KeepAliveAction};
use super::message::{Event, Handler, Message};
use super::options::{ConnectReturnCode, Options, QoS, Settings};
use super::packet::{self, Frame, PacketBuffer, PacketType, Publish};
use super::session::Session;
use crate::network::{Close, Connect, Connection, Read, Write};
use crate::system::timer::Timer;

/// Default packet buffer capacity in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No transport is open.
    Disconnected,
    /// CONNECT sent, waiting for CONNACK.
    Connecting,
    /// The broker accepted the session.
    Connected,
}

#[cfg(feature = "defmt")]
impl defmt::Format for State {
    fn format(&self, f: defmt::Formatter) {
        match self {
            State::Disconnected => defmt::write!(f, "Disconnected"),
            State::Connecting => defmt::write!(f, "Connecting"),
            State::Connected => defmt::write!(f, "Connected"),
        }
    }
}

/// An MQTT 3.1.1 client over one transport and one packet buffer.
///
/// # Type Parameters
///
/// * `C` - opens the transport, see [`Connect`]
/// * `T` - clock and keep-alive timer, see [`Timer`]
/// * `H` - receives inbound messages and events, see [`Handler`]
/// * `N` - packet buffer capacity; no packet larger than this is sent or
///   accepted
pub struct Client<C, T, H = fn(&Message<'_>), const N: usize = DEFAULT_BUFFER_SIZE>
where
    C: Connect,
    T: Timer,
    H: Handler,
{
    connector: C,
    connection: Option<C::Connection>,
    timer: T,
    handler: H,
    settings: Settings,
    buffer: PacketBuffer<N>,
    ids: MessageIds,
    keep_alive: KeepAlive,
    session: Session<N>,
    state: State,
    return_code: Option<ConnectReturnCode>,
    session_present: bool,
}

impl<C, T, H, const N: usize> Client<C, T, H, N>
where
    C: Connect,
    T: Timer,
    H: Handler,
{
    /// Create a disconnected client.
    pub fn new(connector: C, timer: T, settings: Settings, handler: H) -> Self {
        Self {
            connector,
            connection: None,
            timer,
            handler,
            keep_alive: KeepAlive::new(settings.keep_alive_seconds),
            settings,
            buffer: PacketBuffer::new(),
            ids: MessageIds::new(),
            session: Session::new(),
            state: State::Disconnected,
            return_code: None,
            session_present: false,
        }
    }

    /// Change the broker address used by the next [`Client::connect`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `host` is empty or too long.
    pub fn set_broker(&mut self, host: &str, port: u16) -> Result<(), Error> {
        if host.is_empty() {
            return Err(Error::InvalidParameter);
        }
        self.settings = Settings {
            host: host.try_into().map_err(|_| Error::InvalidParameter)?,
            port,
            ..self.settings.clone()
        };
        Ok(())
    }

    /// Change the keep-alive interval used by the next [`Client::connect`].
    pub fn set_keep_alive(&mut self, seconds: u16) {
        self.settings.keep_alive_seconds = seconds;
        self.keep_alive.set_interval(seconds);
    }

    /// Change the retransmission interval. `0` disables idle retransmission.
    pub fn set_retry_interval(&mut self, millis: u32) {
        self.settings.retry_interval_ms = millis;
    }

    /// Replace the message handler. Takes effect immediately.
    pub fn set_handler(&mut self, handler: H) {
        self.handler = handler;
    }

    /// The message handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The message handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the broker accepted the session and it is still up.
    pub fn is_connected(&self) -> bool {
        self.state == State::Connected
    }

    /// Return code of the last completed handshake.
    pub fn return_code(&self) -> Option<ConnectReturnCode> {
        self.return_code
    }

    /// Session-present flag of the last accepted CONNACK.
    pub fn session_present(&self) -> bool {
        self.session_present
    }

    /// Number of outbound QoS 1/2 publishes awaiting acknowledgement.
    pub fn in_flight(&self) -> usize {
        self.session.len()
    }

    /// Open the transport and perform the CONNECT/CONNACK handshake.
    ///
    /// Waits up to the keep-alive interval for CONNACK. On success the
    /// message ID sequence restarts at 1 and the keep-alive timer starts. A
    /// clean session forgets all in-flight publishes; a persistent one
    /// re-sends them on the next [`Client::poll`].
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidParameter`] - see [`Options::validate`]
    /// * [`Error::ConnectionInUse`] - already connected
    /// * [`Error::ClientError`] - the transport could not connect
    /// * [`Error::BufferOverflow`] - CONNECT does not fit in the buffer
    /// * [`Error::TransmissionError`] - write failed or CONNACK malformed
    /// * [`Error::Timeout`] - no CONNACK in time
    /// * [`Error::HostUnreachable`] - the broker refused; see
    ///   [`Client::return_code`]
    ///
    /// Every failure after the transport opened closes it again.
    pub fn connect(&mut self, options: &Options<'_>) -> Result<(), Error> {
        options.validate()?;
        if self.state == State::Connected {
            return Err(Error::ConnectionInUse);
        }

        info!(
            "connecting to {}:{}",
            self.settings.host.as_str(),
            self.settings.port
        );
        let connection = self
            .connector
            .connect(&self.settings.host, self.settings.port)
            .map_err(|_e| {
                error!("transport connect failed");
                Error::ClientError
            })?;
        self.connection = Some(connection);
        self.state = State::Connecting;
        self.return_code = None;
        self.session_present = false;

        match self.handshake(options) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.force_close();
                Err(e)
            }
        }
    }

    fn handshake(&mut self, options: &Options<'_>) -> Result<(), Error> {
        let Self {
            connection,
            timer,
            buffer,
            settings,
            ..
        } = self;
        let connection = connection.as_mut().ok_or(Error::NotConnected)?;

        let bytes = packet::connect(buffer.writer(), options, settings.keep_alive_seconds)?;
        transmit(connection, bytes)?;

        let deadline = timer.now_millis() + settings.connect_timeout_ms();
        let first = read_byte(connection, timer, deadline).inspect_err(|_e| {
            warn!("no CONNACK from broker");
        })?;
        let frame = receive(buffer, connection, timer, first, settings.read_timeout_ms)
            .map_err(|_| Error::TransmissionError)?;
        let body = buffer.body().ok_or(Error::TransmissionError)?;
        let (session_present, code) = packet::connack(&frame.header, body)?;
        let code = ConnectReturnCode::try_from(code)?;

        self.return_code = Some(code);
        if code != ConnectReturnCode::Accepted {
            warn!("broker refused connection: {}", code as u8);
            return Err(Error::HostUnreachable);
        }

        self.state = State::Connected;
        self.session_present = session_present;
        self.ids.reset();
        if options.clean_session {
            self.session.clear();
        } else {
            self.session.clear_requests();
            self.session.mark_all_due();
        }
        self.keep_alive.set_interval(self.settings.keep_alive_seconds);
        self.keep_alive.start(&mut self.timer);
        info!("connected, session present: {}", session_present);
        Ok(())
    }

    /// Send DISCONNECT and close the transport.
    ///
    /// The transport is closed and the keep-alive timer stopped even if
    /// sending DISCONNECT fails.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.as_mut() {
            if transmit(connection, &packet::empty(PacketType::Disconnect)).is_err() {
                warn!("DISCONNECT not sent");
            }
        }
        self.force_close();
        info!("disconnected");
    }

    fn force_close(&mut self) {
        self.keep_alive.stop(&mut self.timer);
        if let Some(connection) = self.connection.take() {
            if connection.close().is_err() {
                warn!("transport close failed");
            }
        }
        self.state = State::Disconnected;
    }

    fn ensure_connected(&mut self) -> Result<(), Error> {
        if self.state != State::Connected {
            return Err(Error::NotConnected);
        }
        if !self.connection.as_ref().is_some_and(|c| c.is_open()) {
            warn!("transport closed by peer");
            self.force_close();
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    /// Publish `payload` on `topic`, without retain.
    ///
    /// See [`Client::publish_with`].
    pub fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<Option<u16>, Error> {
        self.publish_with(topic, payload, qos, false, false)
    }

    /// Publish `payload` on `topic`.
    ///
    /// Returns the message ID assigned to a QoS 1/2 publish, `None` for
    /// QoS 0. QoS 1/2 publishes stay in flight until acknowledged.
    ///
    /// # Errors
    ///
    /// * [`Error::NotConnected`] - no session
    /// * [`Error::InvalidParameter`] - empty topic
    /// * [`Error::InFlightLimit`] - too many unacknowledged publishes
    /// * [`Error::BufferOverflow`] - the packet does not fit in the buffer
    /// * [`Error::TransmissionError`] - the write failed or was short
    pub fn publish_with(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
        dup: bool,
    ) -> Result<Option<u16>, Error> {
        self.ensure_connected()?;
        if topic.is_empty() {
            return Err(Error::InvalidParameter);
        }
        if qos != QoS::AtMostOnce && self.session.is_full() {
            warn!("in-flight table full");
            return Err(Error::InFlightLimit);
        }

        let id = match qos {
            QoS::AtMostOnce => None,
            _ => Some(self.ids.next_unused(|id| self.session.contains(id))),
        };

        let Self {
            connection,
            buffer,
            session,
            timer,
            ..
        } = self;
        let connection = connection.as_mut().ok_or(Error::NotConnected)?;
        let flags = packet::publish_flags(qos, retain, dup);
        let bytes = packet::publish(buffer.writer(), topic, id, payload, flags)?;
        transmit(connection, bytes)?;
        if let Some(id) = id {
            session.track(id, qos, bytes, timer.now_millis())?;
        }
        debug!("published {} bytes, id {}", payload.len(), id.unwrap_or(0));
        Ok(id)
    }

    /// Subscribe to one topic filter.
    ///
    /// The broker's answer arrives later as [`Event::SubAck`].
    ///
    /// # Errors
    ///
    /// As [`Client::publish_with`], except for [`Error::InFlightLimit`].
    pub fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), Error> {
        self.ensure_connected()?;
        if topic.is_empty() {
            return Err(Error::InvalidParameter);
        }
        let id = self.ids.next_unused(|id| self.session.contains(id));
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;
        let bytes = packet::subscribe(self.buffer.writer(), id, topic, qos)?;
        transmit(connection, bytes)?;
        self.session.reserve_request(id);
        debug!("subscribe {}, id {}", topic, id);
        Ok(())
    }

    /// Unsubscribe from one topic filter.
    ///
    /// # Errors
    ///
    /// As [`Client::subscribe`].
    pub fn unsubscribe(&mut self, topic: &str) -> Result<(), Error> {
        self.ensure_connected()?;
        if topic.is_empty() {
            return Err(Error::InvalidParameter);
        }
        let id = self.ids.next_unused(|id| self.session.contains(id));
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;
        let bytes = packet::unsubscribe(self.buffer.writer(), id, topic)?;
        transmit(connection, bytes)?;
        self.session.reserve_request(id);
        debug!("unsubscribe {}, id {}", topic, id);
        Ok(())
    }

    /// Drive the session once.
    ///
    /// Handles a pending keep-alive tick, re-sends overdue publishes and
    /// processes at most one inbound packet. Returns immediately when no
    /// byte is available; once a packet has started, each further byte is
    /// awaited for at most the configured read timeout.
    ///
    /// # Errors
    ///
    /// * [`Error::NotConnected`] - no session, or the peer closed it
    /// * [`Error::Timeout`] - a ping went unanswered; the transport has been
    ///   closed
    /// * [`Error::BufferOverflow`] - an inbound packet was too large and has
    ///   been discarded
    /// * [`Error::TransmissionError`] - read or write failure, or a
    ///   malformed packet
    pub fn poll(&mut self) -> Result<(), Error> {
        self.ensure_connected()?;

        if self.timer.take_tick() {
            match self.keep_alive.on_tick() {
                KeepAliveAction::Ping => {
                    trace!("PINGREQ");
                    let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;
                    transmit(connection, &packet::empty(PacketType::PingReq))?;
                }
                KeepAliveAction::Expired => {
                    error!("keep-alive expired, closing connection");
                    self.force_close();
                    return Err(Error::Timeout);
                }
                KeepAliveAction::Idle => {}
            }
        }

        self.retransmit()?;

        let Self {
            connection,
            timer,
            buffer,
            settings,
            ..
        } = self;
        let connection = connection.as_mut().ok_or(Error::NotConnected)?;
        let Some(first) = try_read_byte(connection)? else {
            return Ok(());
        };
        let frame = match receive(buffer, connection, timer, first, settings.read_timeout_ms) {
            Ok(frame) => frame,
            Err(Error::BufferOverflow) => return Err(Error::BufferOverflow),
            Err(_) => return Err(Error::TransmissionError),
        };
        self.dispatch(frame)
    }

    fn retransmit(&mut self) -> Result<(), Error> {
        let Self {
            connection,
            session,
            timer,
            settings,
            ..
        } = self;
        if session.is_empty() {
            return Ok(());
        }
        let connection = connection.as_mut().ok_or(Error::NotConnected)?;
        session.retransmit(timer.now_millis(), settings.retry_interval_ms, |bytes| {
            transmit(connection, bytes)
        })?;
        Ok(())
    }

    fn dispatch(&mut self, frame: Frame) -> Result<(), Error> {
        let Self {
            connection,
            buffer,
            handler,
            session,
            keep_alive,
            timer,
            ..
        } = self;
        let connection = connection.as_mut().ok_or(Error::NotConnected)?;
        let body = buffer.body().ok_or(Error::TransmissionError)?;
        let header = frame.header;
        trace!("received packet type {}", header.packet_type.code());

        match header.packet_type {
            PacketType::Publish => {
                if header.qos().is_err() {
                    warn!("ignoring PUBLISH with invalid QoS flags {}", header.flags);
                    return Ok(());
                }
                let publish = Publish::parse(&header, body)?;
                let deliver = match publish.qos {
                    QoS::AtMostOnce => true,
                    QoS::AtLeastOnce => {
                        transmit(connection, &packet::ack(PacketType::PubAck, publish.id))?;
                        true
                    }
                    QoS::ExactlyOnce => {
                        let fresh = session.receive_inbound(publish.id);
                        transmit(connection, &packet::ack(PacketType::PubRec, publish.id))?;
                        if !fresh {
                            debug!("duplicate delivery of message {}", publish.id);
                        }
                        fresh
                    }
                };
                if deliver {
                    handler.on_message(&Message {
                        topic: publish.topic,
                        payload: publish.payload,
                        id: publish.id,
                        qos: publish.qos,
                        dup: publish.dup,
                        retain: publish.retain,
                    });
                }
            }
            PacketType::PubAck => {
                let id = packet::ack_id(body)?;
                if !session.on_puback(id) {
                    debug!("PUBACK for unknown message {}", id);
                }
                handler.on_event(Event::PubAck(id));
            }
            PacketType::PubRec => {
                let id = packet::ack_id(body)?;
                if !session.on_pubrec(id, timer.now_millis()) {
                    debug!("PUBREC for unknown message {}", id);
                }
                transmit(connection, &packet::ack(PacketType::PubRel, id))?;
            }
            PacketType::PubRel => {
                let id = packet::ack_id(body)?;
                session.release_inbound(id);
                transmit(connection, &packet::ack(PacketType::PubComp, id))?;
            }
            PacketType::PubComp => {
                let id = packet::ack_id(body)?;
                if !session.on_pubcomp(id) {
                    debug!("PUBCOMP for unknown message {}", id);
                }
                handler.on_event(Event::PubComp(id));
            }
            PacketType::SubAck => {
                let (id, code) = packet::suback(body)?;
                session.complete_request(id);
                let granted = QoS::try_from(code).ok();
                if granted.is_none() {
                    warn!("subscription {} refused", id);
                }
                handler.on_event(Event::SubAck { id, granted });
            }
            PacketType::UnsubAck => {
                let id = packet::ack_id(body)?;
                session.complete_request(id);
                handler.on_event(Event::UnsubAck(id));
            }
            PacketType::PingResp => {
                keep_alive.on_ping_response();
                handler.on_event(Event::PingResp);
            }
            PacketType::PingReq => {
                trace!("PINGREQ from broker");
            }
            PacketType::Connect
            | PacketType::ConnAck
            | PacketType::Subscribe
            | PacketType::Unsubscribe
            | PacketType::Disconnect => {
                warn!("unexpected packet type {}", header.packet_type.code());
            }
            PacketType::Invalid(code) => {
                warn!("ignoring invalid packet type {}", code);
            }
        }
        Ok(())
    }
}

impl<C, T, H, const N: usize> Drop for Client<C, T, H, N>
where
    C: Connect,
    T: Timer,
    H: Handler,
{
    fn drop(&mut self) {
        if self.connection.is_some() {
            self.disconnect();
        }
    }
}

impl<C, T, H, const N: usize> fmt::Debug for Client<C, T, H, N>
where
    C: Connect,
    T: Timer,
    H: Handler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("return_code", &self.return_code)
            .field("session_present", &self.session_present)
            .field("in_flight", &self.session.len())
            .finish_non_exhaustive()
    }
}

/// Write a complete packet. A short write counts as a failure.
fn transmit<W: Write>(connection: &mut W, bytes: &[u8]) -> Result<(), Error> {
    match connection.write(bytes) {
        Ok(n) if n == bytes.len() => {}
        Ok(n) => {
            error!("short write: {} of {} bytes", n, bytes.len());
            return Err(Error::TransmissionError);
        }
        Err(_e) => {
            error!("write failed");
            return Err(Error::TransmissionError);
        }
    }
    connection.flush().map_err(|_e| Error::TransmissionError)
}

fn try_read_byte<R: Read>(connection: &mut R) -> Result<Option<u8>, Error> {
    let mut byte = [0u8; 1];
    match connection.read(&mut byte) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(byte[0])),
        Err(_e) => {
            error!("read failed");
            Err(Error::TransmissionError)
        }
    }
}

/// Wait for one byte until `deadline`, pausing between attempts.
fn read_byte<R: Read, T: Timer>(
    connection: &mut R,
    timer: &mut T,
    deadline: u64,
) -> Result<u8, Error> {
    loop {
        if let Some(byte) = try_read_byte(connection)? {
            return Ok(byte);
        }
        if timer.now_millis() >= deadline {
            return Err(Error::Timeout);
        }
        timer.pause();
    }
}

fn receive<R: Read, T: Timer, const N: usize>(
    buffer: &mut PacketBuffer<N>,
    connection: &mut R,
    timer: &mut T,
    first: u8,
    read_timeout_ms: u32,
) -> Result<Frame, Error> {
    buffer.decode(first, || {
        let deadline = timer.now_millis() + u64::from(read_timeout_ms);
        read_byte(connection, timer, deadline)
    })
}
