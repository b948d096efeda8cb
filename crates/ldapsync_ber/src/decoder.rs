//! BER decoder.

use crate::error::{BerError, BerResult};
use crate::packet::{Class, Form, Packet};

/// Decode a single packet from BER bytes, rejecting trailing input.
///
/// # Errors
///
/// Returns an error if the bytes are not exactly one well-formed packet.
pub fn from_ber(bytes: &[u8]) -> BerResult<Packet> {
    Packet::decode(bytes)
}

/// Maximum nesting depth of constructed packets.
/// Control values are at most a few levels deep; this bounds recursion on
/// untrusted input.
const MAX_DEPTH: usize = 64;

/// A BER decoder over a borrowed buffer.
pub struct BerDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> BerDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Decode the next packet.
    pub fn decode(&mut self) -> BerResult<Packet> {
        if self.depth > MAX_DEPTH {
            return Err(BerError::NestingTooDeep { max: MAX_DEPTH });
        }

        let identifier = self.read_byte()?;
        let class = Class::from_identifier(identifier);
        let form = if identifier & 0x20 != 0 {
            Form::Constructed
        } else {
            Form::Primitive
        };
        let tag = match identifier & 0x1f {
            0x1f => self.read_high_tag()?,
            low => u64::from(low),
        };

        let len = self.read_length()?;
        let content = self.read_bytes(len)?;

        match form {
            Form::Primitive => Ok(Packet::primitive(class, tag, content.to_vec(), "")),
            Form::Constructed => {
                let mut packet = Packet::constructed(class, tag, "");
                let mut inner = BerDecoder {
                    data: content,
                    pos: 0,
                    depth: self.depth + 1,
                };
                while !inner.is_empty() {
                    packet.children.push(inner.decode()?);
                }
                Ok(packet)
            }
        }
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    #[inline]
    fn read_byte(&mut self) -> BerResult<u8> {
        if self.pos >= self.data.len() {
            return Err(BerError::UnexpectedEof);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> BerResult<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(BerError::LengthOverflow)?;
        if end > self.data.len() {
            return Err(BerError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_high_tag(&mut self) -> BerResult<u64> {
        let mut tag: u64 = 0;
        loop {
            let byte = self.read_byte()?;
            if tag > (u64::MAX >> 7) {
                return Err(BerError::TagOverflow);
            }
            tag = (tag << 7) | u64::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok(tag);
            }
        }
    }

    fn read_length(&mut self) -> BerResult<usize> {
        let first = self.read_byte()?;
        if first < 0x80 {
            return Ok(usize::from(first));
        }
        let count = usize::from(first & 0x7f);
        match count {
            0 => Err(BerError::IndefiniteLength),
            1..=8 => {
                let bytes = self.read_bytes(count)?;
                let mut len: u64 = 0;
                for byte in bytes {
                    len = (len << 8) | u64::from(*byte);
                }
                usize::try_from(len).map_err(|_| BerError::LengthOverflow)
            }
            _ => Err(BerError::LengthOverflow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::tag;

    #[test]
    fn decode_boolean() {
        let packet = from_ber(&[0x01, 0x01, 0xff]).unwrap();
        assert!(packet.is_universal(tag::BOOLEAN));
        assert_eq!(packet.as_bool(), Some(true));
    }

    #[test]
    fn decode_negative_integer() {
        let packet = from_ber(&[0x02, 0x02, 0xff, 0x7f]).unwrap();
        assert_eq!(packet.as_integer(), Some(-129));
    }

    #[test]
    fn decode_sequence() {
        let packet = from_ber(&[0x30, 0x07, 0x02, 0x01, 0x05, 0x04, 0x02, b'a', b'b']).unwrap();
        assert!(packet.is_constructed());
        assert_eq!(packet.children.len(), 2);
        assert_eq!(packet.children[0].as_integer(), Some(5));
        assert_eq!(packet.children[1].as_str(), Some("ab"));
    }

    #[test]
    fn decode_long_form_length() {
        let mut bytes = vec![0x04, 0x82, 0x01, 0x2c];
        bytes.extend(std::iter::repeat(0x41).take(300));
        let packet = from_ber(&bytes).unwrap();
        assert_eq!(packet.data.len(), 300);
    }

    #[test]
    fn decode_high_tag_number() {
        let packet = from_ber(&[0x9f, 0x81, 0x48, 0x01, 0x01]).unwrap();
        assert_eq!(packet.class, Class::Context);
        assert_eq!(packet.tag, 200);
    }

    #[test]
    fn reject_indefinite_length() {
        assert_eq!(
            from_ber(&[0x30, 0x80, 0x00, 0x00]),
            Err(BerError::IndefiniteLength)
        );
    }

    #[test]
    fn reject_truncated_input() {
        assert_eq!(from_ber(&[]), Err(BerError::UnexpectedEof));
        assert_eq!(from_ber(&[0x04]), Err(BerError::UnexpectedEof));
        assert_eq!(from_ber(&[0x04, 0x03, 0x41]), Err(BerError::UnexpectedEof));
        assert_eq!(
            from_ber(&[0x30, 0x03, 0x02, 0x05, 0x01]),
            Err(BerError::UnexpectedEof)
        );
    }

    #[test]
    fn reject_trailing_bytes() {
        assert_eq!(
            from_ber(&[0x01, 0x01, 0xff, 0x00]),
            Err(BerError::TrailingBytes { count: 1 })
        );
    }

    #[test]
    fn reject_oversized_length_field() {
        let bytes = [0x04, 0x89, 1, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(from_ber(&bytes), Err(BerError::LengthOverflow));
    }

    #[test]
    fn reject_excessive_nesting() {
        // 70 nested empty-then-wrapped sequences built inside out
        let mut bytes = vec![0x30, 0x00];
        for _ in 0..70 {
            let mut outer = vec![0x30];
            let len = bytes.len();
            if len < 0x80 {
                outer.push(len as u8);
            } else {
                outer.push(0x82);
                outer.extend_from_slice(&(len as u16).to_be_bytes());
            }
            outer.extend_from_slice(&bytes);
            bytes = outer;
        }
        assert!(matches!(
            from_ber(&bytes),
            Err(BerError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn decoder_reads_consecutive_packets() {
        let bytes = [0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let mut decoder = BerDecoder::new(&bytes);
        assert_eq!(decoder.decode().unwrap().as_integer(), Some(1));
        assert_eq!(decoder.remaining().len(), 3);
        assert_eq!(decoder.decode().unwrap().as_integer(), Some(2));
        assert!(decoder.is_empty());
    }
}
