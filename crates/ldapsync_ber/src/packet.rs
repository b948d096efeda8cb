//! BER packet tree.

use crate::decoder::BerDecoder;
use crate::encoder::{encode_integer, BerEncoder};
use crate::error::{BerError, BerResult};
use std::fmt;

/// Universal tag numbers used by LDAP controls.
pub mod tag {
    /// BOOLEAN.
    pub const BOOLEAN: u64 = 0x01;
    /// INTEGER.
    pub const INTEGER: u64 = 0x02;
    /// OCTET STRING.
    pub const OCTET_STRING: u64 = 0x04;
    /// NULL.
    pub const NULL: u64 = 0x05;
    /// ENUMERATED.
    pub const ENUMERATED: u64 = 0x0a;
    /// SEQUENCE and SEQUENCE OF.
    pub const SEQUENCE: u64 = 0x10;
    /// SET and SET OF.
    pub const SET: u64 = 0x11;
}

/// Tag class (the two high bits of the identifier octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// Universal ASN.1 types.
    Universal,
    /// Application-wide tags (LDAP protocol ops).
    Application,
    /// Context-specific tags.
    Context,
    /// Private tags.
    Private,
}

impl Class {
    /// Returns the identifier bits for this class.
    pub fn bits(self) -> u8 {
        match self {
            Class::Universal => 0x00,
            Class::Application => 0x40,
            Class::Context => 0x80,
            Class::Private => 0xc0,
        }
    }

    /// Extracts the class from an identifier octet.
    pub fn from_identifier(identifier: u8) -> Self {
        match identifier & 0xc0 {
            0x00 => Class::Universal,
            0x40 => Class::Application,
            0x80 => Class::Context,
            _ => Class::Private,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Class::Universal => "Universal",
            Class::Application => "Application",
            Class::Context => "Context",
            Class::Private => "Private",
        };
        f.write_str(name)
    }
}

/// Primitive or constructed encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// Content is a raw byte string.
    Primitive,
    /// Content is a series of nested packets.
    Constructed,
}

/// A node in a BER packet tree.
///
/// Primitive packets carry their content in `data`. Constructed packets
/// carry it in `children`. A primitive packet may also carry children when a
/// nested value has been unwrapped from an OCTET STRING (see
/// [`Packet::unwrap_nested`]); it then encodes its children as content.
///
/// `description` is diagnostic only and never affects the encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Tag class.
    pub class: Class,
    /// Primitive or constructed.
    pub form: Form,
    /// Tag number.
    pub tag: u64,
    /// Primitive content.
    pub data: Vec<u8>,
    /// Nested packets.
    pub children: Vec<Packet>,
    /// Human-readable annotation.
    pub description: String,
}

impl Packet {
    /// Creates a primitive packet with the given content.
    pub fn primitive(
        class: Class,
        tag: u64,
        data: Vec<u8>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            class,
            form: Form::Primitive,
            tag,
            data,
            children: Vec::new(),
            description: description.into(),
        }
    }

    /// Creates an empty constructed packet.
    pub fn constructed(class: Class, tag: u64, description: impl Into<String>) -> Self {
        Self {
            class,
            form: Form::Constructed,
            tag,
            data: Vec::new(),
            children: Vec::new(),
            description: description.into(),
        }
    }

    /// Creates an empty universal SEQUENCE.
    pub fn sequence(description: impl Into<String>) -> Self {
        Self::constructed(Class::Universal, tag::SEQUENCE, description)
    }

    /// Creates a universal OCTET STRING.
    pub fn octet_string(bytes: impl Into<Vec<u8>>, description: impl Into<String>) -> Self {
        Self::primitive(Class::Universal, tag::OCTET_STRING, bytes.into(), description)
    }

    /// Creates a universal OCTET STRING holding UTF-8 text.
    pub fn string(text: &str, description: impl Into<String>) -> Self {
        Self::octet_string(text.as_bytes(), description)
    }

    /// Creates a universal INTEGER.
    pub fn integer(value: i64, description: impl Into<String>) -> Self {
        Self::primitive(Class::Universal, tag::INTEGER, encode_integer(value), description)
    }

    /// Creates a universal ENUMERATED.
    pub fn enumerated(value: i64, description: impl Into<String>) -> Self {
        Self::primitive(
            Class::Universal,
            tag::ENUMERATED,
            encode_integer(value),
            description,
        )
    }

    /// Creates a universal BOOLEAN.
    pub fn boolean(value: bool, description: impl Into<String>) -> Self {
        let byte = if value { 0xff } else { 0x00 };
        Self::primitive(Class::Universal, tag::BOOLEAN, vec![byte], description)
    }

    /// Appends a child and returns the packet.
    #[must_use]
    pub fn with_child(mut self, child: Packet) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child.
    pub fn push(&mut self, child: Packet) {
        self.children.push(child);
    }

    /// Returns the child at `index`, if any.
    pub fn child(&self, index: usize) -> Option<&Packet> {
        self.children.get(index)
    }

    /// Returns true if this packet is constructed.
    pub fn is_constructed(&self) -> bool {
        self.form == Form::Constructed
    }

    /// Returns true if this is a universal packet with the given tag.
    pub fn is_universal(&self, tag: u64) -> bool {
        self.class == Class::Universal && self.tag == tag
    }

    /// Returns true if this is a context-specific packet with the given tag.
    pub fn is_context(&self, tag: u64) -> bool {
        self.class == Class::Context && self.tag == tag
    }

    /// Interprets the content as a BOOLEAN.
    pub fn as_bool(&self) -> Option<bool> {
        match self.data.as_slice() {
            [byte] if self.children.is_empty() => Some(*byte != 0),
            _ => None,
        }
    }

    /// Interprets the content as a two's-complement INTEGER or ENUMERATED.
    ///
    /// Returns `None` for empty content or content wider than 64 bits.
    pub fn as_integer(&self) -> Option<i64> {
        if self.is_constructed() || self.data.is_empty() || self.data.len() > 8 {
            return None;
        }
        let fill = if self.data[0] & 0x80 != 0 { 0xff } else { 0x00 };
        let mut buf = [fill; 8];
        buf[8 - self.data.len()..].copy_from_slice(&self.data);
        Some(i64::from_be_bytes(buf))
    }

    /// Interprets the content as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        if self.is_constructed() {
            return None;
        }
        std::str::from_utf8(&self.data).ok()
    }

    /// Returns the content octets exactly as they would be encoded.
    pub fn content_bytes(&self) -> Vec<u8> {
        if self.children.is_empty() {
            return self.data.clone();
        }
        let mut encoder = BerEncoder::new();
        for child in &self.children {
            encoder.encode(child);
        }
        encoder.into_bytes()
    }

    /// Encodes this packet to BER bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = BerEncoder::new();
        encoder.encode(self);
        encoder.into_bytes()
    }

    /// Decodes exactly one packet from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a single well-formed packet.
    pub fn decode(bytes: &[u8]) -> BerResult<Packet> {
        let mut decoder = BerDecoder::new(bytes);
        let packet = decoder.decode()?;
        if !decoder.is_empty() {
            return Err(BerError::TrailingBytes {
                count: decoder.remaining().len(),
            });
        }
        Ok(packet)
    }

    /// Parses the content of a primitive value as a nested packet.
    ///
    /// The nested packet becomes this packet's only child and `data` is
    /// cleared, so the encoding is unchanged. Calling this on a packet that
    /// already has children just returns the first child.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is empty or not a single packet.
    pub fn unwrap_nested(&mut self) -> BerResult<&mut Packet> {
        if self.children.is_empty() {
            if self.data.is_empty() {
                return Err(BerError::invalid_structure("empty nested value"));
            }
            let nested = Packet::decode(&self.data)?;
            self.data.clear();
            self.children.push(nested);
        }
        Ok(&mut self.children[0])
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let form = match self.form {
            Form::Primitive => "Primitive",
            Form::Constructed => "Constructed",
        };
        write!(
            f,
            "{:indent$}{} {} {} Len={}",
            "",
            self.class,
            form,
            self.tag_name(),
            self.content_bytes().len(),
            indent = depth * 2
        )?;
        if self.children.is_empty() {
            if let Some(value) = self.render_value() {
                write!(f, " Value={value}")?;
            }
        }
        if !self.description.is_empty() {
            write!(f, " \"{}\"", self.description)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }

    fn tag_name(&self) -> String {
        if self.class != Class::Universal {
            return format!("[{}]", self.tag);
        }
        let name = match self.tag {
            tag::BOOLEAN => "Boolean",
            tag::INTEGER => "Integer",
            tag::OCTET_STRING => "Octet String",
            tag::NULL => "NULL",
            tag::ENUMERATED => "Enumerated",
            tag::SEQUENCE => "Sequence",
            tag::SET => "Set",
            other => return format!("Tag({other})"),
        };
        name.to_string()
    }

    fn render_value(&self) -> Option<String> {
        if self.is_constructed() {
            return None;
        }
        if self.is_universal(tag::BOOLEAN) {
            return self.as_bool().map(|b| b.to_string());
        }
        if self.is_universal(tag::INTEGER) || self.is_universal(tag::ENUMERATED) {
            return self.as_integer().map(|n| n.to_string());
        }
        if self.data.is_empty() {
            return None;
        }
        match self.as_str() {
            Some(text) if text.chars().all(|c| !c.is_control()) => Some(format!("{text:?}")),
            _ => Some(format!("0x{}", hex::encode(&self.data))),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_accessor_sign_extends() {
        assert_eq!(Packet::integer(-1, "").as_integer(), Some(-1));
        assert_eq!(Packet::integer(128, "").as_integer(), Some(128));
        assert_eq!(Packet::integer(i64::MIN, "").as_integer(), Some(i64::MIN));
        assert_eq!(Packet::octet_string(Vec::new(), "").as_integer(), None);
    }

    #[test]
    fn boolean_accessor() {
        assert_eq!(Packet::boolean(true, "").as_bool(), Some(true));
        assert_eq!(Packet::boolean(false, "").as_bool(), Some(false));
        assert_eq!(Packet::octet_string(vec![1, 2], "").as_bool(), None);
    }

    #[test]
    fn unwrap_nested_preserves_encoding() {
        let inner = Packet::sequence("inner").with_child(Packet::integer(7, "n"));
        let mut value = Packet::octet_string(inner.encode(), "value");
        let before = value.encode();

        let nested = value.unwrap_nested().unwrap();
        assert!(nested.is_universal(tag::SEQUENCE));
        assert_eq!(nested.children[0].as_integer(), Some(7));

        assert!(value.data.is_empty());
        assert_eq!(value.encode(), before);
    }

    #[test]
    fn unwrap_nested_rejects_empty_value() {
        let mut value = Packet::octet_string(Vec::new(), "value");
        assert!(matches!(
            value.unwrap_nested(),
            Err(BerError::InvalidStructure { .. })
        ));
    }

    #[test]
    fn display_includes_descriptions() {
        let packet = Packet::sequence("Control")
            .with_child(Packet::string("1.2.3", "Control Type"))
            .with_child(Packet::boolean(true, "Criticality"));
        let dump = packet.to_string();
        assert!(dump.contains("Sequence"));
        assert!(dump.contains("\"Control Type\""));
        assert!(dump.contains("Value=\"1.2.3\""));
        assert!(dump.contains("Value=true"));
    }
}
