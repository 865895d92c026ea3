//! Remaining-length encoding.
//!
//! The fixed header stores the size of everything that follows it as a
//! variable-length integer: seven value bits per byte, least significant
//! group first, with the high bit set on every byte except the last.
//!
//! | Bytes | Range                     |
//! |-------|---------------------------|
//! | 1     | 0 ..= 127                 |
//! | 2     | 128 ..= 16 383            |
//! | 3     | 16 384 ..= 2 097 151      |
//! | 4     | 2 097 152 ..= 268 435 455 |

use super::error::Error;

/// Largest value the four-byte encoding can carry.
pub const MAX_REMAINING_LENGTH: u32 = 268_435_455;

/// Maximum number of bytes in an encoded remaining length.
pub const MAX_LEN: usize = 4;

/// Encode `value` into `buf`, returning the number of bytes used.
///
/// Always uses the minimal number of bytes.
///
/// # Errors
///
/// [`Error::MalformedLength`] if `value` exceeds [`MAX_REMAINING_LENGTH`].
///
/// # Examples
///
/// ```rust
/// use libmqtt::mqtt::varint;
///
/// let mut buf = [0u8; 4];
/// let n = varint::encode(321, &mut buf).unwrap();
/// assert_eq!(&buf[..n], &[0xC1, 0x02]);
/// ```
pub fn encode(mut value: u32, buf: &mut [u8; MAX_LEN]) -> Result<usize, Error> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::MalformedLength);
    }
    let mut len = 0;
    loop {
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= 0x80;
        }
        buf[len] = byte;
        len += 1;
        if value == 0 {
            return Ok(len);
        }
    }
}

/// Number of bytes [`encode`] would use for `value`.
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}

/// Decode a complete remaining length from the front of `buf`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// [`Error::MalformedLength`] if a fifth byte would be needed or `buf` ends
/// before a byte with the continuation bit clear.
pub fn decode(buf: &[u8]) -> Result<(u32, usize), Error> {
    let mut decoder = Decoder::new();
    for (i, &byte) in buf.iter().enumerate() {
        if let Some(value) = decoder.push(byte)? {
            return Ok((value, i + 1));
        }
    }
    Err(Error::MalformedLength)
}

/// Incremental decoder fed one byte at a time straight off the wire.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decoder {
    value: u32,
    count: usize,
}

impl Decoder {
    /// A decoder that has not seen any byte yet.
    pub const fn new() -> Self {
        Self { value: 0, count: 0 }
    }

    /// Feed the next byte.
    ///
    /// Returns `Ok(Some(value))` once the terminating byte arrives and
    /// `Ok(None)` while more bytes are expected.
    pub fn push(&mut self, byte: u8) -> Result<Option<u32>, Error> {
        if self.count == MAX_LEN {
            return Err(Error::MalformedLength);
        }
        self.value |= u32::from(byte & 0x7F) << (7 * self.count);
        self.count += 1;
        if byte & 0x80 == 0 {
            Ok(Some(self.value))
        } else if self.count == MAX_LEN {
            Err(Error::MalformedLength)
        } else {
            Ok(None)
        }
    }

    /// Bytes consumed so far.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no byte has been consumed yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
