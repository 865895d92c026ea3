//! Control packet codec over a single fixed-capacity buffer.
//!
//! [`PacketBuffer`] holds at most one packet at a time, either one being
//! built for transmission or the last one received.
//!
//! Outbound packets are built front to back starting at
//! [`FIXED_HEADER_SIZE`]; once the body length is known the fixed header is
//! written backwards into the reserved space directly in front of the body,
//! so no second buffer is needed:
//!
//! ```text
//!  0        1        2        3        4        5
//! +--------+--------+--------+--------+--------+---------------------+
//! | unused | unused | type   | len    | len    | variable header ... |
//! +--------+--------+--------+--------+--------+---------------------+
//!                   ^ frame start (2-byte remaining length)
//! ```
//!
//! Inbound packets are decoded from offset zero.

use super::error::Error;
use super::options::{Options, QoS};
use super::varint;

/// Space reserved in front of every outbound body: one type/flags byte plus
/// the longest remaining-length encoding.
pub const FIXED_HEADER_SIZE: usize = 1 + varint::MAX_LEN;

/// Protocol name carried in CONNECT.
pub const PROTOCOL_NAME: &str = "MQTT";

/// Protocol level for MQTT 3.1.1.
pub const PROTOCOL_LEVEL: u8 = 4;

/// Flags nibble required on PUBREL, SUBSCRIBE and UNSUBSCRIBE.
const RESERVED_FLAGS: u8 = 0b0010;

/// MQTT control packet kinds.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketType {
    /// Client request to connect.
    Connect,
    /// Connect acknowledgement.
    ConnAck,
    /// Publish message.
    Publish,
    /// QoS 1 publish acknowledgement.
    PubAck,
    /// QoS 2 publish received.
    PubRec,
    /// QoS 2 publish release.
    PubRel,
    /// QoS 2 publish complete.
    PubComp,
    /// Subscribe request.
    Subscribe,
    /// Subscribe acknowledgement.
    SubAck,
    /// Unsubscribe request.
    Unsubscribe,
    /// Unsubscribe acknowledgement.
    UnsubAck,
    /// Ping request.
    PingReq,
    /// Ping response.
    PingResp,
    /// Client is disconnecting.
    Disconnect,
    /// Reserved type nibble (0 or 15).
    Invalid(u8),
}

impl PacketType {
    /// Decode the high nibble of a fixed-header byte.
    pub fn from_header(byte: u8) -> Self {
        match byte >> 4 {
            1 => PacketType::Connect,
            2 => PacketType::ConnAck,
            3 => PacketType::Publish,
            4 => PacketType::PubAck,
            5 => PacketType::PubRec,
            6 => PacketType::PubRel,
            7 => PacketType::PubComp,
            8 => PacketType::Subscribe,
            9 => PacketType::SubAck,
            10 => PacketType::Unsubscribe,
            11 => PacketType::UnsubAck,
            12 => PacketType::PingReq,
            13 => PacketType::PingResp,
            14 => PacketType::Disconnect,
            other => PacketType::Invalid(other),
        }
    }

    /// The four-bit type code.
    pub fn code(self) -> u8 {
        match self {
            PacketType::Connect => 1,
            PacketType::ConnAck => 2,
            PacketType::Publish => 3,
            PacketType::PubAck => 4,
            PacketType::PubRec => 5,
            PacketType::PubRel => 6,
            PacketType::PubComp => 7,
            PacketType::Subscribe => 8,
            PacketType::SubAck => 9,
            PacketType::Unsubscribe => 10,
            PacketType::UnsubAck => 11,
            PacketType::PingReq => 12,
            PacketType::PingResp => 13,
            PacketType::Disconnect => 14,
            PacketType::Invalid(code) => code & 0x0F,
        }
    }

    /// First fixed-header byte for this type with the given flags nibble.
    pub fn header(self, flags: u8) -> u8 {
        (self.code() << 4) | (flags & 0x0F)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PacketType {
    fn format(&self, f: defmt::Formatter) {
        match self {
            PacketType::Invalid(code) => defmt::write!(f, "Invalid({})", code),
            other => defmt::write!(f, "{}", other.code()),
        }
    }
}

/// A decoded fixed header.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FixedHeader {
    /// Packet kind.
    pub packet_type: PacketType,
    /// Low nibble of the first byte.
    pub flags: u8,
    /// Size of everything after the fixed header.
    pub remaining_length: u32,
}

impl FixedHeader {
    /// Build a header from the first byte and the decoded remaining length.
    pub fn new(first: u8, remaining_length: u32) -> Self {
        Self {
            packet_type: PacketType::from_header(first),
            flags: first & 0x0F,
            remaining_length,
        }
    }

    /// QoS bits of a PUBLISH header.
    pub fn qos(&self) -> Result<QoS, Error> {
        QoS::try_from((self.flags >> 1) & 0x03).map_err(|_| Error::TransmissionError)
    }

    /// DUP bit of a PUBLISH header.
    pub fn dup(&self) -> bool {
        self.flags & 0x08 != 0
    }

    /// RETAIN bit of a PUBLISH header.
    pub fn retain(&self) -> bool {
        self.flags & 0x01 != 0
    }
}

/// Location of the packet currently held by a [`PacketBuffer`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Frame {
    /// The decoded fixed header.
    pub header: FixedHeader,
    /// Size of the fixed header in bytes (2 to 5).
    pub header_len: usize,
    /// Total bytes received, fixed header included.
    pub len: usize,
}

/// The single packet buffer shared by encoding and decoding.
#[derive(Debug)]
pub struct PacketBuffer<const N: usize> {
    buf: [u8; N],
    frame: Option<Frame>,
}

impl<const N: usize> Default for PacketBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PacketBuffer<N> {
    /// An empty buffer.
    pub const fn new() -> Self {
        const { assert!(N > FIXED_HEADER_SIZE, "packet buffer too small") };
        Self {
            buf: [0; N],
            frame: None,
        }
    }

    /// Total capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Start building an outbound packet.
    ///
    /// This discards the previously decoded packet.
    pub fn writer(&mut self) -> PacketWriter<'_> {
        self.frame = None;
        PacketWriter {
            buf: &mut self.buf,
            pos: FIXED_HEADER_SIZE,
        }
    }

    /// Decode one packet whose first byte has already been read.
    ///
    /// `next_byte` supplies the following bytes from the transport. The
    /// remaining length is checked against the capacity before any byte is
    /// stored, so an oversized packet leaves the previous frame intact; its
    /// body is drained from `next_byte` and discarded.
    ///
    /// # Errors
    ///
    /// * [`Error::MalformedLength`] - invalid remaining-length field
    /// * [`Error::BufferOverflow`] - the packet does not fit
    /// * anything `next_byte` returns
    pub fn decode<F>(&mut self, first: u8, mut next_byte: F) -> Result<Frame, Error>
    where
        F: FnMut() -> Result<u8, Error>,
    {
        let mut header = [0u8; FIXED_HEADER_SIZE];
        header[0] = first;
        let mut header_len = 1;
        let mut decoder = varint::Decoder::new();
        let remaining = loop {
            let byte = next_byte()?;
            header[header_len] = byte;
            header_len += 1;
            if let Some(value) = decoder.push(byte)? {
                break value;
            }
        };

        let len = usize::try_from(remaining)
            .ok()
            .and_then(|remaining| remaining.checked_add(header_len))
            .filter(|&len| len <= N);
        let Some(len) = len else {
            warn!("inbound packet body of {} bytes exceeds buffer", remaining);
            for _ in 0..remaining {
                if next_byte().is_err() {
                    break;
                }
            }
            return Err(Error::BufferOverflow);
        };

        self.frame = None;
        self.buf[..header_len].copy_from_slice(&header[..header_len]);
        for slot in &mut self.buf[header_len..len] {
            *slot = next_byte()?;
        }

        let frame = Frame {
            header: FixedHeader::new(first, remaining),
            header_len,
            len,
        };
        self.frame = Some(frame);
        Ok(frame)
    }

    /// The last successfully decoded frame.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Variable header and payload of the last decoded frame.
    pub fn body(&self) -> Option<&[u8]> {
        self.frame.map(|f| &self.buf[f.header_len..f.len])
    }

    /// Complete bytes of the last decoded frame.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.frame.map(|f| &self.buf[..f.len])
    }
}

/// Appends fields to an outbound packet body.
///
/// Every `put_*` is all-or-nothing: a field that does not fit returns
/// [`Error::BufferOverflow`] and writes nothing.
#[derive(Debug)]
pub struct PacketWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> PacketWriter<'a> {
    /// Bytes written to the body so far.
    pub fn len(&self) -> usize {
        self.pos - FIXED_HEADER_SIZE
    }

    /// Whether the body is still empty.
    pub fn is_empty(&self) -> bool {
        self.pos == FIXED_HEADER_SIZE
    }

    /// Space left for the body.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Append raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > self.remaining() {
            return Err(Error::BufferOverflow);
        }
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Append one byte.
    pub fn put_u8(&mut self, value: u8) -> Result<(), Error> {
        self.put_bytes(&[value])
    }

    /// Append a big-endian 16-bit integer.
    pub fn put_u16(&mut self, value: u16) -> Result<(), Error> {
        self.put_bytes(&value.to_be_bytes())
    }

    /// Append a 2-byte length prefix followed by `data`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `data` is longer than 65 535 bytes,
    /// [`Error::BufferOverflow`] if prefix and data do not fit.
    pub fn put_binary(&mut self, data: &[u8]) -> Result<(), Error> {
        let len = u16::try_from(data.len()).map_err(|_| Error::InvalidParameter)?;
        if data.len() + 2 > self.remaining() {
            return Err(Error::BufferOverflow);
        }
        self.put_u16(len)?;
        self.put_bytes(data)
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn put_str(&mut self, value: &str) -> Result<(), Error> {
        self.put_binary(value.as_bytes())
    }

    /// Write the fixed header in front of the body and return the frame.
    pub fn finish(self, packet_type: PacketType, flags: u8) -> Result<&'a [u8], Error> {
        let body_len = u32::try_from(self.len()).map_err(|_| Error::BufferOverflow)?;
        let mut length = [0u8; varint::MAX_LEN];
        let n = varint::encode(body_len, &mut length).map_err(|_| Error::BufferOverflow)?;

        let start = FIXED_HEADER_SIZE - n - 1;
        let end = self.pos;
        let buf: &'a mut [u8] = self.buf;
        buf[start] = packet_type.header(flags);
        buf[start + 1..FIXED_HEADER_SIZE].copy_from_slice(&length[..n]);
        let buf: &'a [u8] = buf;
        Ok(&buf[start..end])
    }
}

/// A four-byte acknowledgement carrying only a message ID.
///
/// PUBREL gets the mandatory `0b0010` flags nibble.
pub fn ack(packet_type: PacketType, id: u16) -> [u8; 4] {
    let flags = if packet_type == PacketType::PubRel {
        RESERVED_FLAGS
    } else {
        0
    };
    let [hi, lo] = id.to_be_bytes();
    [packet_type.header(flags), 0x02, hi, lo]
}

/// A two-byte packet with no body (PINGREQ, DISCONNECT).
pub fn empty(packet_type: PacketType) -> [u8; 2] {
    [packet_type.header(0), 0x00]
}

/// Build CONNECT.
pub fn connect<'a>(
    mut w: PacketWriter<'a>,
    options: &Options<'_>,
    keep_alive: u16,
) -> Result<&'a [u8], Error> {
    w.put_str(PROTOCOL_NAME)?;
    w.put_u8(PROTOCOL_LEVEL)?;
    w.put_u8(options.connect_flags())?;
    w.put_u16(keep_alive)?;
    w.put_str(options.client_id)?;
    if let Some(will) = &options.will {
        w.put_str(will.topic)?;
        w.put_binary(will.message)?;
    }
    if let Some(user) = &options.user {
        w.put_str(user.name)?;
        if let Some(password) = user.password {
            w.put_binary(password)?;
        }
    }
    w.finish(PacketType::Connect, 0)
}

/// Flags nibble of a PUBLISH header.
pub fn publish_flags(qos: QoS, retain: bool, dup: bool) -> u8 {
    let mut flags = (qos as u8) << 1;
    if retain {
        flags |= 0x01;
    }
    if dup {
        flags |= 0x08;
    }
    flags
}

/// Build PUBLISH. `id` must be present exactly when `qos` is above zero.
pub fn publish<'a>(
    mut w: PacketWriter<'a>,
    topic: &str,
    id: Option<u16>,
    payload: &[u8],
    flags: u8,
) -> Result<&'a [u8], Error> {
    w.put_str(topic)?;
    if let Some(id) = id {
        w.put_u16(id)?;
    }
    w.put_bytes(payload)?;
    w.finish(PacketType::Publish, flags)
}

/// Build SUBSCRIBE for a single topic filter.
pub fn subscribe<'a>(
    mut w: PacketWriter<'a>,
    id: u16,
    topic: &str,
    qos: QoS,
) -> Result<&'a [u8], Error> {
    w.put_u16(id)?;
    w.put_str(topic)?;
    w.put_u8(qos as u8)?;
    w.finish(PacketType::Subscribe, RESERVED_FLAGS)
}

/// Build UNSUBSCRIBE for a single topic filter.
pub fn unsubscribe<'a>(mut w: PacketWriter<'a>, id: u16, topic: &str) -> Result<&'a [u8], Error> {
    w.put_u16(id)?;
    w.put_str(topic)?;
    w.finish(PacketType::Unsubscribe, RESERVED_FLAGS)
}

/// An inbound PUBLISH borrowed from the packet buffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Publish<'a> {
    /// Topic name.
    pub topic: &'a str,
    /// Message ID, `0` for QoS 0.
    pub id: u16,
    /// Application payload.
    pub payload: &'a [u8],
    /// Delivery QoS.
    pub qos: QoS,
    /// Re-delivery flag.
    pub dup: bool,
    /// Retained message flag.
    pub retain: bool,
}

impl<'a> Publish<'a> {
    /// Parse the body of a PUBLISH.
    ///
    /// # Errors
    ///
    /// [`Error::TransmissionError`] if the topic length overruns the body,
    /// the topic is not UTF-8, the message ID is missing or the QoS bits
    /// are `3`.
    pub fn parse(header: &FixedHeader, body: &'a [u8]) -> Result<Self, Error> {
        let qos = header.qos()?;
        let (topic, rest) = split_str(body)?;
        let (id, payload) = if qos == QoS::AtMostOnce {
            (0, rest)
        } else {
            split_u16(rest)?
        };
        Ok(Self {
            topic,
            id,
            payload,
            qos,
            dup: header.dup(),
            retain: header.retain(),
        })
    }
}

/// Message ID at the start of an acknowledgement body.
pub fn ack_id(body: &[u8]) -> Result<u16, Error> {
    split_u16(body).map(|(id, _)| id)
}

/// Session-present flag and raw return code of a CONNACK.
pub fn connack(header: &FixedHeader, body: &[u8]) -> Result<(bool, u8), Error> {
    if header.packet_type != PacketType::ConnAck || body.len() != 2 {
        return Err(Error::TransmissionError);
    }
    Ok((body[0] & 0x01 != 0, body[1]))
}

/// Message ID and first return code of a SUBACK.
pub fn suback(body: &[u8]) -> Result<(u16, u8), Error> {
    let (id, codes) = split_u16(body)?;
    let code = *codes.first().ok_or(Error::TransmissionError)?;
    Ok((id, code))
}

fn split_u16(bytes: &[u8]) -> Result<(u16, &[u8]), Error> {
    match bytes {
        [hi, lo, rest @ ..] => Ok((u16::from_be_bytes([*hi, *lo]), rest)),
        _ => Err(Error::TransmissionError),
    }
}

fn split_str(bytes: &[u8]) -> Result<(&str, &[u8]), Error> {
    let (len, rest) = split_u16(bytes)?;
    let len = usize::from(len);
    if len > rest.len() {
        return Err(Error::TransmissionError);
    }
    let (text, rest) = rest.split_at(len);
    let text = core::str::from_utf8(text).map_err(|_| Error::TransmissionError)?;
    Ok((text, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mqtt::options::Will;

    fn feed<'a>(bytes: &'a [u8]) -> impl FnMut() -> Result<u8, Error> + 'a {
        let mut iter = bytes.iter();
        move || iter.next().copied().ok_or(Error::Timeout)
    }

    #[test]
    fn test_packet_type_nibbles() {
        assert_eq!(PacketType::from_header(0x82), PacketType::Subscribe);
        assert_eq!(PacketType::from_header(0xD0), PacketType::PingResp);
        assert_eq!(PacketType::from_header(0x00), PacketType::Invalid(0));
        assert_eq!(PacketType::from_header(0xF0), PacketType::Invalid(15));
        assert_eq!(PacketType::PubRel.header(RESERVED_FLAGS), 0x62);
    }

    #[test]
    fn test_header_written_backwards() {
        let mut buffer = PacketBuffer::<64>::new();
        let mut w = buffer.writer();
        w.put_bytes(&[0xAA; 3]).unwrap();
        let frame = w.finish(PacketType::Publish, 0x01).unwrap();
        assert_eq!(frame, &[0x31, 0x03, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_two_byte_remaining_length() {
        let mut buffer = PacketBuffer::<256>::new();
        let mut w = buffer.writer();
        w.put_bytes(&[0x55; 200]).unwrap();
        let frame = w.finish(PacketType::Publish, 0).unwrap();
        assert_eq!(&frame[..3], &[0x30, 0xC8, 0x01]);
        assert_eq!(frame.len(), 203);
    }

    #[test]
    fn test_writer_overflow_writes_nothing() {
        let mut buffer = PacketBuffer::<16>::new();
        let mut w = buffer.writer();
        w.put_str("abc").unwrap();
        assert_eq!(w.put_str("this does not fit"), Err(Error::BufferOverflow));
        assert_eq!(w.len(), 5);
        assert_eq!(w.put_bytes(&[0; 7]), Err(Error::BufferOverflow));
        w.put_bytes(&[0; 6]).unwrap();
        assert_eq!(w.remaining(), 0);
    }

    #[test]
    fn test_connect_with_will() {
        let mut buffer = PacketBuffer::<256>::new();
        let options = Options::new("Argon").with_will(Will {
            topic: "/help",
            message: b"Help me!",
            qos: QoS::AtMostOnce,
            retain: false,
        });
        let frame = connect(buffer.writer(), &options, 10).unwrap();

        let mut expected = [0u8; 36];
        let mut w = &mut expected[..];
        for part in [
            &[0x10, 34][..],
            &[0x00, 0x04],
            b"MQTT",
            &[0x04, 0x06, 0x00, 0x0A],
            &[0x00, 0x05],
            b"Argon",
            &[0x00, 0x05],
            b"/help",
            &[0x00, 0x08],
            b"Help me!",
        ] {
            let (head, tail) = w.split_at_mut(part.len());
            head.copy_from_slice(part);
            w = tail;
        }
        assert!(w.is_empty());
        assert_eq!(frame, &expected[..]);
    }

    #[test]
    fn test_subscribe_frame() {
        let mut buffer = PacketBuffer::<64>::new();
        let frame = subscribe(buffer.writer(), 1, "/test", QoS::AtMostOnce).unwrap();
        assert_eq!(
            frame,
            &[0x82, 0x0A, 0x00, 0x01, 0x00, 0x05, b'/', b't', b'e', b's', b't', 0x00]
        );
    }

    #[test]
    fn test_unsubscribe_frame() {
        let mut buffer = PacketBuffer::<64>::new();
        let frame = unsubscribe(buffer.writer(), 0x0102, "a/b").unwrap();
        assert_eq!(frame, &[0xA2, 0x07, 0x01, 0x02, 0x00, 0x03, b'a', b'/', b'b']);
    }

    #[test]
    fn test_acks() {
        assert_eq!(ack(PacketType::PubAck, 7), [0x40, 0x02, 0x00, 0x07]);
        assert_eq!(ack(PacketType::PubRec, 9), [0x50, 0x02, 0x00, 0x09]);
        assert_eq!(ack(PacketType::PubRel, 0x1234), [0x62, 0x02, 0x12, 0x34]);
        assert_eq!(ack(PacketType::PubComp, 9), [0x70, 0x02, 0x00, 0x09]);
        assert_eq!(empty(PacketType::PingReq), [0xC0, 0x00]);
        assert_eq!(empty(PacketType::Disconnect), [0xE0, 0x00]);
    }

    #[test]
    fn test_decode_publish() {
        let mut buffer = PacketBuffer::<64>::new();
        let wire = [0x09, 0x00, 0x03, b'a', b'/', b'b', 0x00, 0x07, b'h', b'i'];
        let frame = buffer.decode(0x3B, feed(&wire)).unwrap();
        assert_eq!(frame.header_len, 2);
        assert_eq!(frame.len, 11);
        assert_eq!(frame.header.packet_type, PacketType::Publish);

        let publish = Publish::parse(&frame.header, buffer.body().unwrap()).unwrap();
        assert_eq!(publish.topic, "a/b");
        assert_eq!(publish.id, 7);
        assert_eq!(publish.payload, b"hi");
        assert_eq!(publish.qos, QoS::AtLeastOnce);
        assert!(publish.dup);
        assert!(publish.retain);
    }

    #[test]
    fn test_decode_overflow_keeps_previous_frame() {
        let mut buffer = PacketBuffer::<16>::new();
        let first = buffer.decode(0xD0, feed(&[0x00])).unwrap();
        assert_eq!(buffer.bytes(), Some(&[0xD0, 0x00][..]));

        let oversized = [0x20, 0xAA];
        assert_eq!(
            buffer.decode(0x30, feed(&oversized)),
            Err(Error::BufferOverflow)
        );
        assert_eq!(buffer.frame(), Some(&first));
        assert_eq!(buffer.bytes(), Some(&[0xD0, 0x00][..]));
    }

    #[test]
    fn test_decode_maximum_declared_length() {
        let mut buffer = PacketBuffer::<16>::new();
        let first = buffer.decode(0xD0, feed(&[0x00])).unwrap();

        let declared = [0xFF, 0xFF, 0xFF, 0x7F, 0x00, 0x01];
        assert_eq!(
            buffer.decode(0x30, feed(&declared)),
            Err(Error::BufferOverflow)
        );
        assert_eq!(buffer.frame(), Some(&first));
    }

    #[test]
    fn test_decode_exact_capacity() {
        let mut buffer = PacketBuffer::<8>::new();
        let frame = buffer.decode(0x30, feed(&[0x06, 0, 1, b'x', 1, 2, 3])).unwrap();
        assert_eq!(frame.len, 8);
        assert_eq!(buffer.body(), Some(&[0, 1, b'x', 1, 2, 3][..]));
    }

    #[test]
    fn test_decode_malformed_length() {
        let mut buffer = PacketBuffer::<16>::new();
        assert_eq!(
            buffer.decode(0x30, feed(&[0xFF, 0xFF, 0xFF, 0xFF, 0x01])),
            Err(Error::MalformedLength)
        );
        assert!(buffer.frame().is_none());
    }

    #[test]
    fn test_parse_publish_errors() {
        let header = FixedHeader::new(0x32, 0);
        assert_eq!(
            Publish::parse(&header, &[0x00, 0x09, b'a']),
            Err(Error::TransmissionError)
        );
        assert_eq!(
            Publish::parse(&header, &[0x00, 0x01, b'a']),
            Err(Error::TransmissionError)
        );
        let bad_qos = FixedHeader::new(0x36, 0);
        assert_eq!(
            Publish::parse(&bad_qos, &[0x00, 0x01, b'a', 0, 1]),
            Err(Error::TransmissionError)
        );
    }

    #[test]
    fn test_connack_and_suback() {
        let header = FixedHeader::new(0x20, 2);
        assert_eq!(connack(&header, &[0x01, 0x05]), Ok((true, 5)));
        assert_eq!(connack(&header, &[0x00]), Err(Error::TransmissionError));
        let wrong = FixedHeader::new(0x90, 2);
        assert_eq!(connack(&wrong, &[0, 0]), Err(Error::TransmissionError));

        assert_eq!(suback(&[0x00, 0x02, 0x01]), Ok((2, 1)));
        assert_eq!(suback(&[0x00, 0x02]), Err(Error::TransmissionError));
    }
}
