//! In-memory transport and timer shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use libmqtt::mqtt::{Client, Event, Handler, Message, Options, QoS, Settings};
use libmqtt::network::error::Error as NetError;
use libmqtt::network::{Close, Connect, Connection, Read, Write};
use libmqtt::system::timer::Timer;

pub const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

/// How far the mock clock moves on every `pause`.
pub const PAUSE_STEP_MS: u64 = 5;

#[derive(Debug, Default)]
pub struct Wire {
    pub incoming: VecDeque<u8>,
    pub written: Vec<u8>,
    pub open: bool,
    pub fail_writes: bool,
    pub short_writes: bool,
    pub refuse: bool,
    pub connects: usize,
    pub closes: usize,
}

/// Connector handing out connections that all share one [`Wire`].
#[derive(Debug, Clone, Default)]
pub struct MockNet {
    pub wire: Rc<RefCell<Wire>>,
}

impl MockNet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes the broker "sends".
    pub fn push(&self, bytes: &[u8]) {
        self.wire.borrow_mut().incoming.extend(bytes.iter().copied());
    }

    /// Everything the client wrote since the last call.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.wire.borrow_mut().written)
    }

    pub fn written_len(&self) -> usize {
        self.wire.borrow().written.len()
    }

    pub fn refuse(&self, refuse: bool) {
        self.wire.borrow_mut().refuse = refuse;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.wire.borrow_mut().fail_writes = fail;
    }

    pub fn short_writes(&self, short: bool) {
        self.wire.borrow_mut().short_writes = short;
    }

    /// Simulate the peer dropping the connection.
    pub fn hang_up(&self) {
        self.wire.borrow_mut().open = false;
    }

    pub fn is_open(&self) -> bool {
        self.wire.borrow().open
    }

    pub fn connects(&self) -> usize {
        self.wire.borrow().connects
    }

    pub fn closes(&self) -> usize {
        self.wire.borrow().closes
    }
}

#[derive(Debug)]
pub struct MockConnection {
    wire: Rc<RefCell<Wire>>,
}

impl Read for MockConnection {
    type Error = NetError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        let n = buf.len().min(wire.incoming.len());
        for slot in buf.iter_mut().take(n) {
            *slot = wire.incoming.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for MockConnection {
    type Error = NetError;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_writes {
            return Err(NetError::WriteError);
        }
        let n = if wire.short_writes {
            buf.len().saturating_sub(1)
        } else {
            buf.len()
        };
        wire.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = NetError;

    fn close(self) -> Result<(), Self::Error> {
        let mut wire = self.wire.borrow_mut();
        wire.open = false;
        wire.closes += 1;
        Ok(())
    }
}

impl Connection for MockConnection {
    fn is_open(&self) -> bool {
        self.wire.borrow().open
    }
}

impl Connect for MockNet {
    type Connection = MockConnection;
    type Error = NetError;

    fn connect(&mut self, _host: &str, _port: u16) -> Result<Self::Connection, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if wire.refuse {
            return Err(NetError::ConnectionRefused);
        }
        wire.open = true;
        wire.connects += 1;
        Ok(MockConnection {
            wire: Rc::clone(&self.wire),
        })
    }
}

/// Clock that only moves when told to, or by [`PAUSE_STEP_MS`] per pause.
#[derive(Debug, Clone, Default)]
pub struct MockTimer {
    pub clock: Rc<Cell<u64>>,
    pub tick: Rc<Cell<bool>>,
    pub period: Rc<Cell<Option<u32>>>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, millis: u64) {
        self.clock.set(self.clock.get() + millis);
    }

    /// Post a keep-alive tick.
    pub fn fire(&self) {
        self.tick.set(true);
    }

    pub fn period(&self) -> Option<u32> {
        self.period.get()
    }
}

impl Timer for MockTimer {
    fn now_millis(&self) -> u64 {
        self.clock.get()
    }

    fn start(&mut self, period_ms: u32) {
        self.period.set(Some(period_ms));
        self.tick.set(false);
    }

    fn stop(&mut self) {
        self.period.set(None);
        self.tick.set(false);
    }

    fn take_tick(&mut self) -> bool {
        self.tick.replace(false)
    }

    fn pause(&mut self) {
        self.advance(PAUSE_STEP_MS);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub topic: String,
    pub payload: Vec<u8>,
    pub id: u16,
    pub qos: QoS,
    pub dup: bool,
    pub retain: bool,
    /// Bytes the client had written when the message was delivered.
    pub written_before: Vec<u8>,
}

/// Handler that records everything it is given.
#[derive(Debug)]
pub struct Recorder {
    wire: Rc<RefCell<Wire>>,
    pub messages: Vec<Received>,
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn new(net: &MockNet) -> Self {
        Self {
            wire: Rc::clone(&net.wire),
            messages: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl Handler for Recorder {
    fn on_message(&mut self, message: &Message<'_>) {
        self.messages.push(Received {
            topic: message.topic.to_string(),
            payload: message.payload.to_vec(),
            id: message.id,
            qos: message.qos,
            dup: message.dup,
            retain: message.retain,
            written_before: self.wire.borrow().written.clone(),
        });
    }

    fn on_event(&mut self, event: Event) {
        self.events.push(event);
    }
}

pub type TestClient = Client<MockNet, MockTimer, Recorder>;

pub struct Harness {
    pub client: TestClient,
    pub net: MockNet,
    pub timer: MockTimer,
}

pub fn settings() -> Settings {
    Settings::new("broker.local", 1883).unwrap()
}

/// A disconnected client over fresh mocks.
pub fn harness() -> Harness {
    let net = MockNet::new();
    let timer = MockTimer::new();
    let client = Client::new(net.clone(), timer.clone(), settings(), Recorder::new(&net));
    Harness { client, net, timer }
}

/// A client that completed the handshake; the CONNECT bytes are discarded.
pub fn connected(options: &Options<'_>) -> Harness {
    let mut h = harness();
    h.net.push(&CONNACK_ACCEPTED);
    h.client.connect(options).unwrap();
    h.net.take_written();
    h
}

/// Build a PUBLISH frame the way a broker would send it.
pub fn inbound_publish(topic: &str, id: Option<u16>, payload: &[u8], flags: u8) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    body.extend_from_slice(topic.as_bytes());
    if let Some(id) = id {
        body.extend_from_slice(&id.to_be_bytes());
    }
    body.extend_from_slice(payload);
    assert!(body.len() < 128);
    let mut frame = vec![0x30 | flags, body.len() as u8];
    frame.extend_from_slice(&body);
    frame
}
