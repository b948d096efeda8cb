//! # ldapsync BER
//!
//! Basic Encoding Rules packet trees for LDAP control values.
//!
//! This crate provides the small subset of BER that LDAP controls need:
//! - A [`Packet`] tree (class, form, tag, content, children)
//! - A definite-length encoder with minimal integer and length forms
//! - A decoder that rejects indefinite lengths and truncated input
//! - Diagnostic annotations and an indented tree dump
//!
//! ## Usage
//!
//! ```
//! use ldapsync_ber::{from_ber, Packet};
//!
//! let value = Packet::sequence("Search Control Value")
//!     .with_child(Packet::integer(100, "Paging Size"))
//!     .with_child(Packet::octet_string(Vec::new(), "Cookie"));
//! let bytes = value.encode();
//!
//! let decoded = from_ber(&bytes).unwrap();
//! assert_eq!(decoded.children[0].as_integer(), Some(100));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod packet;

pub use decoder::{from_ber, BerDecoder};
pub use encoder::{to_ber, BerEncoder};
pub use error::{BerError, BerResult};
pub use packet::{tag, Class, Form, Packet};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = Packet> {
        prop_oneof![
            any::<bool>().prop_map(|b| Packet::boolean(b, "")),
            any::<i64>().prop_map(|n| Packet::integer(n, "")),
            any::<i64>().prop_map(|n| Packet::enumerated(n, "")),
            prop::collection::vec(any::<u8>(), 0..300).prop_map(|b| Packet::octet_string(b, "")),
            (0u64..100_000, prop::collection::vec(any::<u8>(), 0..8))
                .prop_map(|(t, b)| Packet::primitive(Class::Context, t, b, "")),
        ]
    }

    fn tree() -> impl Strategy<Value = Packet> {
        leaf().prop_recursive(4, 32, 6, |inner| {
            prop::collection::vec(inner, 0..6).prop_map(|children| {
                let mut seq = Packet::sequence("");
                seq.children = children;
                seq
            })
        })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(packet in tree()) {
            let bytes = packet.encode();
            let decoded = from_ber(&bytes).unwrap();
            prop_assert_eq!(decoded, packet);
        }

        #[test]
        fn integers_survive_encoding(n in any::<i64>()) {
            let decoded = from_ber(&Packet::integer(n, "").encode()).unwrap();
            prop_assert_eq!(decoded.as_integer(), Some(n));
        }
    }
}
