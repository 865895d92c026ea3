//! Per-session QoS 1/2 bookkeeping.
//!
//! Outbound publishes stay in a small fixed table until their final
//! acknowledgement arrives, so they can be re-sent with DUP set. Inbound
//! QoS 2 IDs are remembered between PUBREC and PUBREL so a re-delivered
//! PUBLISH is not handed to the application twice. SUBSCRIBE and
//! UNSUBSCRIBE IDs stay reserved until SUBACK or UNSUBACK.

use heapless::Vec;

use super::error::Error;
use super::options::QoS;
use super::packet::{self, PacketType};

/// Maximum number of unacknowledged outbound QoS 1/2 publishes.
pub const MAX_IN_FLIGHT: usize = 4;

/// Maximum number of inbound QoS 2 IDs awaiting PUBREL.
pub const MAX_INBOUND: usize = 8;

/// Maximum number of SUBSCRIBE/UNSUBSCRIBE requests awaiting their ack.
pub const MAX_REQUESTS: usize = 4;

/// DUP bit in the first byte of a PUBLISH.
const DUP: u8 = 0x08;

/// Where an outbound publish is in its handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// QoS 1, waiting for PUBACK.
    AwaitingPubAck,
    /// QoS 2, waiting for PUBREC.
    AwaitingPubRec,
    /// QoS 2, PUBREL sent, waiting for PUBCOMP.
    AwaitingPubComp,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Stage {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Stage::AwaitingPubAck => defmt::write!(f, "AwaitingPubAck"),
            Stage::AwaitingPubRec => defmt::write!(f, "AwaitingPubRec"),
            Stage::AwaitingPubComp => defmt::write!(f, "AwaitingPubComp"),
        }
    }
}

/// One unacknowledged outbound publish.
#[derive(Debug, Clone)]
pub struct Outbound<const N: usize> {
    /// Message ID.
    pub id: u16,
    /// Handshake stage.
    pub stage: Stage,
    /// When the last packet for this entry was written, `None` if it is due
    /// right away.
    pub last_sent: Option<u64>,
    packet: Vec<u8, N>,
}

/// In-flight table for one client.
#[derive(Debug, Clone)]
pub struct Session<const N: usize> {
    outbound: Vec<Outbound<N>, MAX_IN_FLIGHT>,
    inbound: Vec<u16, MAX_INBOUND>,
    requests: Vec<u16, MAX_REQUESTS>,
}

impl<const N: usize> Default for Session<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Session<N> {
    /// An empty session.
    pub const fn new() -> Self {
        Self {
            outbound: Vec::new(),
            inbound: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Number of outbound publishes awaiting acknowledgement.
    pub fn len(&self) -> usize {
        self.outbound.len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty()
    }

    /// Whether another outbound publish can be tracked.
    pub fn is_full(&self) -> bool {
        self.outbound.is_full()
    }

    /// Whether `id` belongs to an outbound publish still in flight or to an
    /// unacknowledged SUBSCRIBE/UNSUBSCRIBE.
    pub fn contains(&self, id: u16) -> bool {
        self.outbound.iter().any(|entry| entry.id == id) || self.requests.contains(&id)
    }

    /// Stage of the outbound publish `id`.
    pub fn stage(&self, id: u16) -> Option<Stage> {
        self.outbound
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.stage)
    }

    /// Remember a freshly sent publish.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidParameter`] for QoS 0
    /// * [`Error::InFlightLimit`] if the table is full
    /// * [`Error::BufferOverflow`] if `packet` is larger than the buffer
    pub fn track(&mut self, id: u16, qos: QoS, packet: &[u8], now: u64) -> Result<(), Error> {
        let stage = match qos {
            QoS::AtMostOnce => return Err(Error::InvalidParameter),
            QoS::AtLeastOnce => Stage::AwaitingPubAck,
            QoS::ExactlyOnce => Stage::AwaitingPubRec,
        };
        if self.is_full() {
            return Err(Error::InFlightLimit);
        }
        let packet = Vec::from_slice(packet).map_err(|_| Error::BufferOverflow)?;
        self.outbound
            .push(Outbound {
                id,
                stage,
                last_sent: Some(now),
                packet,
            })
            .map_err(|_| Error::InFlightLimit)
    }

    /// PUBACK for `id`. Returns whether it retired a QoS 1 publish.
    pub fn on_puback(&mut self, id: u16) -> bool {
        self.retire(id, Stage::AwaitingPubAck)
    }

    /// PUBREC for `id`. Returns whether a QoS 2 publish is (now) awaiting
    /// PUBCOMP; the caller answers with PUBREL either way.
    pub fn on_pubrec(&mut self, id: u16, now: u64) -> bool {
        match self.outbound.iter_mut().find(|entry| entry.id == id) {
            Some(entry) if entry.stage != Stage::AwaitingPubAck => {
                entry.stage = Stage::AwaitingPubComp;
                entry.last_sent = Some(now);
                entry.packet.clear();
                true
            }
            _ => false,
        }
    }

    /// PUBCOMP for `id`. Returns whether it retired a QoS 2 publish.
    pub fn on_pubcomp(&mut self, id: u16) -> bool {
        self.retire(id, Stage::AwaitingPubComp)
    }

    fn retire(&mut self, id: u16, stage: Stage) -> bool {
        match self
            .outbound
            .iter()
            .position(|entry| entry.id == id && entry.stage == stage)
        {
            Some(index) => {
                self.outbound.remove(index);
                true
            }
            None => false,
        }
    }

    /// Make every outbound entry due for retransmission.
    pub fn mark_all_due(&mut self) {
        for entry in self.outbound.iter_mut() {
            entry.last_sent = None;
        }
    }

    /// Re-send entries idle for at least `interval_ms` and entries marked
    /// due. `interval_ms == 0` only re-sends marked entries.
    ///
    /// PUBLISH is re-sent with DUP set; an entry awaiting PUBCOMP re-sends
    /// PUBREL. Returns how many packets were written.
    pub fn retransmit<F>(&mut self, now: u64, interval_ms: u32, mut send: F) -> Result<usize, Error>
    where
        F: FnMut(&[u8]) -> Result<(), Error>,
    {
        let mut sent = 0;
        for entry in self.outbound.iter_mut() {
            let due = match entry.last_sent {
                None => true,
                Some(at) => interval_ms > 0 && now.saturating_sub(at) >= u64::from(interval_ms),
            };
            if !due {
                continue;
            }
            if entry.stage == Stage::AwaitingPubComp {
                send(&packet::ack(PacketType::PubRel, entry.id)[..])?;
            } else {
                if let Some(first) = entry.packet.first_mut() {
                    *first |= DUP;
                }
                send(entry.packet.as_slice())?;
            }
            warn!("re-sent message {}", entry.id);
            entry.last_sent = Some(now);
            sent += 1;
        }
        Ok(sent)
    }

    /// Remember an inbound QoS 2 ID. Returns `false` if it was already
    /// pending, meaning the PUBLISH is a re-delivery.
    ///
    /// When the table is full the oldest ID is forgotten.
    pub fn receive_inbound(&mut self, id: u16) -> bool {
        if self.inbound.contains(&id) {
            return false;
        }
        if self.inbound.is_full() {
            warn!("inbound table full, dropping message {}", self.inbound[0]);
            self.inbound.remove(0);
        }
        let _ = self.inbound.push(id);
        true
    }

    /// PUBREL for an inbound ID. Returns whether it was pending.
    pub fn release_inbound(&mut self, id: u16) -> bool {
        match self.inbound.iter().position(|&pending| pending == id) {
            Some(index) => {
                self.inbound.remove(index);
                true
            }
            None => false,
        }
    }

    /// Reserve the ID of a SUBSCRIBE or UNSUBSCRIBE until its ack arrives.
    ///
    /// When the table is full the oldest reservation is dropped.
    pub fn reserve_request(&mut self, id: u16) {
        if self.requests.is_full() {
            warn!("no SUBACK/UNSUBACK for request {}, releasing it", self.requests[0]);
            self.requests.remove(0);
        }
        let _ = self.requests.push(id);
    }

    /// SUBACK or UNSUBACK for `id`. Returns whether it was reserved.
    pub fn complete_request(&mut self, id: u16) -> bool {
        match self.requests.iter().position(|&pending| pending == id) {
            Some(index) => {
                self.requests.remove(index);
                true
            }
            None => false,
        }
    }

    /// Release every SUBSCRIBE/UNSUBSCRIBE reservation. A broker does not
    /// answer requests from an earlier connection.
    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    /// Forget all state.
    pub fn clear(&mut self) {
        self.outbound.clear();
        self.inbound.clear();
        self.requests.clear();
    }
}
