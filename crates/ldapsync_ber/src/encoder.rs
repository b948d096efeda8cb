//! Definite-length BER encoder.

use crate::packet::{Form, Packet};

/// Encode a packet tree to BER bytes.
///
/// The output always uses definite lengths, the shortest length form, and
/// minimal two's-complement integers, which is what LDAP peers expect.
pub fn to_ber(packet: &Packet) -> Vec<u8> {
    let mut encoder = BerEncoder::new();
    encoder.encode(packet);
    encoder.into_bytes()
}

/// A BER encoder writing into an owned buffer.
pub struct BerEncoder {
    buffer: Vec<u8>,
}

impl BerEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a packet and everything below it.
    pub fn encode(&mut self, packet: &Packet) {
        self.encode_identifier(packet);
        if packet.children.is_empty() {
            self.encode_length(packet.data.len());
            self.buffer.extend_from_slice(&packet.data);
        } else {
            let mut content = BerEncoder::new();
            for child in &packet.children {
                content.encode(child);
            }
            let content = content.into_bytes();
            self.encode_length(content.len());
            self.buffer.extend_from_slice(&content);
        }
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_identifier(&mut self, packet: &Packet) {
        let mut identifier = packet.class.bits();
        if packet.form == Form::Constructed {
            identifier |= 0x20;
        }

        if packet.tag < 0x1f {
            self.buffer.push(identifier | packet.tag as u8);
            return;
        }

        // High-tag-number form: base-128 digits, most significant first
        self.buffer.push(identifier | 0x1f);
        let mut digits = Vec::new();
        let mut tag = packet.tag;
        loop {
            digits.push((tag & 0x7f) as u8);
            tag >>= 7;
            if tag == 0 {
                break;
            }
        }
        for (i, digit) in digits.iter().rev().enumerate() {
            let more = if i + 1 < digits.len() { 0x80 } else { 0x00 };
            self.buffer.push(digit | more);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_length(&mut self, len: usize) {
        if len < 0x80 {
            self.buffer.push(len as u8);
            return;
        }
        let bytes = (len as u64).to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        self.buffer.push(0x80 | (bytes.len() - skip) as u8);
        self.buffer.extend_from_slice(&bytes[skip..]);
    }
}

impl Default for BerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal two's-complement content octets for an INTEGER or ENUMERATED.
pub(crate) fn encode_integer(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant_zero = bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0;
        let redundant_ones = bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0;
        if !(redundant_zero || redundant_ones) {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}
