//! Tests against a real broker. Run with
//! `cargo test --features std --test broker -- --ignored`.
//!
//! The broker address comes from `TEST_MQTT_ADDRESS` (`host:port`), read from
//! the environment or a `.env` file.

use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::time::{Duration, Instant};

use dotenvy::dotenv;
use libmqtt::mqtt::{Client, ConnectReturnCode, Event, Handler, Message, Options, QoS, Settings};
use libmqtt::network::tcp::TcpConnector;
use libmqtt::system::timer::StdTimer;

#[derive(Default)]
struct Inbox {
    messages: Vec<(String, Vec<u8>)>,
    events: Vec<Event>,
}

struct Shared(Rc<RefCell<Inbox>>);

impl Handler for Shared {
    fn on_message(&mut self, message: &Message<'_>) {
        self.0
            .borrow_mut()
            .messages
            .push((message.topic.to_string(), message.payload.to_vec()));
    }

    fn on_event(&mut self, event: Event) {
        self.0.borrow_mut().events.push(event);
    }
}

fn broker_settings() -> Settings {
    dotenv().ok();
    let address = env::var("TEST_MQTT_ADDRESS").unwrap_or("test.mosquitto.org:1883".to_string());
    let (host, port) = address.rsplit_once(':').expect("address must be host:port");
    Settings::new(host, port.parse().expect("invalid port")).expect("host name too long")
}

fn client(inbox: &Rc<RefCell<Inbox>>) -> Client<TcpConnector, StdTimer, Shared> {
    Client::new(
        TcpConnector,
        StdTimer::new(),
        broker_settings(),
        Shared(Rc::clone(inbox)),
    )
}

fn poll_until(
    client: &mut Client<TcpConnector, StdTimer, Shared>,
    mut done: impl FnMut() -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        client.poll().expect("poll failed");
        if done() {
            return true;
        }
    }
    false
}

#[test]
#[ignore]
fn test_connect_to_broker() {
    let inbox = Rc::new(RefCell::new(Inbox::default()));
    let mut client = client(&inbox);
    client
        .connect(&Options::new("libmqtt-test-connect"))
        .expect("connect failed");
    assert!(client.is_connected());
    assert_eq!(client.return_code(), Some(ConnectReturnCode::Accepted));
    client.disconnect();
    assert!(!client.is_connected());
}

#[test]
#[ignore]
fn test_publish_and_subscribe() {
    let inbox = Rc::new(RefCell::new(Inbox::default()));
    let mut client = client(&inbox);
    client
        .connect(&Options::new("libmqtt-test-pubsub"))
        .expect("connect failed");

    let topic = "libmqtt/test-topic";
    client
        .subscribe(topic, QoS::AtLeastOnce)
        .expect("subscribe failed");
    assert!(poll_until(&mut client, || {
        inbox
            .borrow()
            .events
            .iter()
            .any(|e| matches!(e, Event::SubAck { .. }))
    }));

    for qos in [QoS::AtMostOnce, QoS::AtLeastOnce, QoS::ExactlyOnce] {
        client
            .publish(topic, b"hello world", qos)
            .expect("publish failed");
    }
    assert!(poll_until(&mut client, || {
        inbox.borrow().messages.len() >= 3 && client_idle(&inbox)
    }));
    for (received, payload) in inbox.borrow().messages.iter() {
        assert_eq!(received, topic);
        assert_eq!(payload, b"hello world");
    }
}

fn client_idle(inbox: &Rc<RefCell<Inbox>>) -> bool {
    let inbox = inbox.borrow();
    inbox.events.contains(&Event::PubAck(2)) && inbox.events.contains(&Event::PubComp(3))
}
