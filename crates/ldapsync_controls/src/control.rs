//! The control sum type and its codec.

use crate::change_notify::ChangeNotifyControl;
use crate::content_sync::{ContentSyncControl, ContentSyncDoneControl, ContentSyncStateControl};
use crate::dirsync::{DirSyncControl, DirSyncExControl};
use crate::error::{ControlError, ControlResult};
use crate::paging::PagingControl;
use crate::password_change::{PasswordMustChangeControl, PasswordWarningControl};
use crate::password_policy::BeheraPasswordPolicyControl;
use crate::raw::RawControl;
use crate::registry::{type_description, ControlKind};
use crate::show_deleted::ShowDeletedControl;
use ldapsync_ber::{tag, Class, Packet};
use std::fmt;
use tracing::debug;

/// An LDAP control attached to a request or response.
///
/// Each typed variant corresponds to one OID in the
/// [registry](crate::registry). Controls with any other OID decode to
/// [`Control::Raw`], which keeps the OID and value bytes untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Simple paged results.
    Paging(PagingControl),
    /// Behera password policy.
    BeheraPasswordPolicy(BeheraPasswordPolicyControl),
    /// Netscape password must change.
    PasswordMustChange(PasswordMustChangeControl),
    /// Netscape password expiry warning.
    PasswordWarning(PasswordWarningControl),
    /// AD change notification.
    ChangeNotify(ChangeNotifyControl),
    /// Content sync request.
    ContentSync(ContentSyncControl),
    /// Content sync per-entry state.
    ContentSyncState(ContentSyncStateControl),
    /// Content sync done.
    ContentSyncDone(ContentSyncDoneControl),
    /// AD DirSync.
    DirSync(DirSyncControl),
    /// AD DirSync extended DN.
    DirSyncEx(DirSyncExControl),
    /// AD show deleted.
    ShowDeleted(ShowDeletedControl),
    /// Control without a typed variant.
    Raw(RawControl),
}

/// A concrete control type that can be extracted from a [`Control`].
pub trait ControlVariant: Into<Control> {
    /// The variant's discriminant.
    const KIND: ControlKind;

    /// Borrows the variant out of a control, if it matches.
    fn from_control(control: &Control) -> Option<&Self>;

    /// Mutably borrows the variant out of a control, if it matches.
    fn from_control_mut(control: &mut Control) -> Option<&mut Self>;
}

macro_rules! control_variants {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Control {
                fn from(control: $ty) -> Self {
                    Control::$variant(control)
                }
            }

            impl ControlVariant for $ty {
                const KIND: ControlKind = ControlKind::$variant;

                fn from_control(control: &Control) -> Option<&Self> {
                    match control {
                        Control::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_control_mut(control: &mut Control) -> Option<&mut Self> {
                    match control {
                        Control::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )+

        impl Control {
            /// Returns the variant discriminant.
            pub fn kind(&self) -> ControlKind {
                match self {
                    $(Control::$variant(_) => ControlKind::$variant,)+
                }
            }
        }

        impl fmt::Display for Control {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Control::$variant(inner) => fmt::Display::fmt(inner, f),)+
                }
            }
        }
    };
}

control_variants! {
    Paging(PagingControl),
    BeheraPasswordPolicy(BeheraPasswordPolicyControl),
    PasswordMustChange(PasswordMustChangeControl),
    PasswordWarning(PasswordWarningControl),
    ChangeNotify(ChangeNotifyControl),
    ContentSync(ContentSyncControl),
    ContentSyncState(ContentSyncStateControl),
    ContentSyncDone(ContentSyncDoneControl),
    DirSync(DirSyncControl),
    DirSyncEx(DirSyncExControl),
    ShowDeleted(ShowDeletedControl),
    Raw(RawControl),
}

impl Control {
    /// Returns the control type OID.
    pub fn oid(&self) -> &str {
        match self {
            Control::Raw(raw) => &raw.control_type,
            other => other.kind().oid().unwrap_or_default(),
        }
    }

    /// Encodes the control as a `Control` sequence.
    ///
    /// Returns `None` for response-only controls that have no request form.
    pub fn encode(&self) -> Option<Packet> {
        let packet = match self {
            Control::Paging(c) => c.encode(),
            Control::BeheraPasswordPolicy(c) => c.encode(),
            Control::PasswordMustChange(_) | Control::PasswordWarning(_) => return None,
            Control::ChangeNotify(c) => c.encode(),
            Control::ContentSync(c) => c.encode(),
            Control::ContentSyncState(c) => c.encode(),
            Control::ContentSyncDone(c) => c.encode(),
            Control::DirSync(c) => c.encode(),
            Control::DirSyncEx(c) => c.encode(),
            Control::ShowDeleted(c) => c.encode(),
            Control::Raw(c) => c.encode(),
        };
        Some(packet)
    }

    /// Borrows the concrete variant `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::TypeMismatch`] if this control is another variant.
    pub fn downcast_ref<T: ControlVariant>(&self) -> ControlResult<&T> {
        let actual = self.kind();
        T::from_control(self).ok_or(ControlError::TypeMismatch {
            expected: T::KIND,
            actual,
        })
    }

    /// Mutably borrows the concrete variant `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::TypeMismatch`] if this control is another variant.
    pub fn downcast_mut<T: ControlVariant>(&mut self) -> ControlResult<&mut T> {
        let actual = self.kind();
        T::from_control_mut(self).ok_or(ControlError::TypeMismatch {
            expected: T::KIND,
            actual,
        })
    }
}

/// Returns the first control whose OID is `oid`.
pub fn find_control<'a>(controls: &'a [Control], oid: &str) -> Option<&'a Control> {
    controls.iter().find(|c| c.oid() == oid)
}

/// Finds the control registered for `T` and borrows it as `T`.
///
/// Typed variants are looked up by their registered OID. [`RawControl`] has
/// no OID of its own, so `T = RawControl` returns the first raw control.
///
/// # Errors
///
/// Returns [`ControlError::NotFound`] if no control has `T`'s OID and
/// [`ControlError::TypeMismatch`] if the control with that OID is another
/// variant.
pub fn expect_control<T: ControlVariant>(controls: &[Control]) -> ControlResult<&T> {
    match T::KIND.oid() {
        Some(oid) => find_control(controls, oid)
            .ok_or(ControlError::NotFound { oid })?
            .downcast_ref::<T>(),
        None => controls
            .iter()
            .find_map(T::from_control)
            .ok_or(ControlError::NotFound {
                oid: T::KIND.name(),
            }),
    }
}

/// Mutable counterpart of [`expect_control`].
///
/// # Errors
///
/// Same as [`expect_control`].
pub fn expect_control_mut<T: ControlVariant>(controls: &mut [Control]) -> ControlResult<&mut T> {
    match T::KIND.oid() {
        Some(oid) => controls
            .iter_mut()
            .find(|c| c.oid() == oid)
            .ok_or(ControlError::NotFound { oid })?
            .downcast_mut::<T>(),
        None => controls
            .iter_mut()
            .find_map(T::from_control_mut)
            .ok_or(ControlError::NotFound {
                oid: T::KIND.name(),
            }),
    }
}

/// Decodes one `Control` sequence into a typed control.
///
/// The packet is annotated with descriptions along the way; the annotations
/// are diagnostic only. Unknown OIDs decode to [`Control::Raw`].
///
/// # Errors
///
/// Returns an error if the envelope or a typed control value is malformed.
pub fn decode_control(packet: &mut Packet) -> ControlResult<Control> {
    if !packet.is_constructed() {
        return Err(ControlError::malformed("generic", "control is not a sequence"));
    }
    let count = packet.children.len();
    if count == 0 || count > 3 {
        return Err(ControlError::malformed(
            "generic",
            format!("control has {count} elements"),
        ));
    }

    let type_packet = &mut packet.children[0];
    let oid = match type_packet.as_str() {
        Some(oid) if type_packet.is_universal(tag::OCTET_STRING) => oid.to_string(),
        _ => {
            return Err(ControlError::malformed(
                "generic",
                "control type is not an octet string",
            ))
        }
    };
    type_packet.description = type_description(&oid);

    let mut criticality = false;
    let value_index = match count {
        3 => {
            criticality = read_criticality(&mut packet.children[1])?;
            Some(2)
        }
        2 if packet.children[1].is_universal(tag::BOOLEAN) => {
            criticality = read_criticality(&mut packet.children[1])?;
            None
        }
        2 => Some(1),
        _ => None,
    };

    let value = match value_index {
        Some(i) => {
            let value = &mut packet.children[i];
            value.description = "Control Value".to_string();
            Some(value)
        }
        None => None,
    };

    let control = match ControlKind::from_oid(&oid) {
        ControlKind::Paging => PagingControl::decode(value)?.into(),
        ControlKind::BeheraPasswordPolicy => BeheraPasswordPolicyControl::decode(value)?.into(),
        ControlKind::PasswordMustChange => PasswordMustChangeControl::decode(value).into(),
        ControlKind::PasswordWarning => PasswordWarningControl::decode(value).into(),
        ControlKind::ChangeNotify => ChangeNotifyControl::decode(criticality, value)?.into(),
        ControlKind::ContentSync => ContentSyncControl::decode(value)?.into(),
        ControlKind::ContentSyncState => ContentSyncStateControl::decode(value)?.into(),
        ControlKind::ContentSyncDone => ContentSyncDoneControl::decode(value)?.into(),
        ControlKind::DirSync => DirSyncControl::decode(criticality, value)?.into(),
        ControlKind::DirSyncEx => DirSyncExControl::decode(value)?.into(),
        ControlKind::ShowDeleted => ShowDeletedControl::decode(criticality).into(),
        ControlKind::Raw => RawControl::decode(oid, criticality, value).into(),
    };
    Ok(control)
}

/// Decodes a `Control` sequence from BER bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a well-formed control.
pub fn decode_control_bytes(bytes: &[u8]) -> ControlResult<Control> {
    let mut packet = Packet::decode(bytes)?;
    decode_control(&mut packet)
}

/// Decodes every control in a `Controls` sequence.
///
/// # Errors
///
/// Returns the first decode error; controls decoded before it are dropped.
pub fn decode_controls(packet: &mut Packet) -> ControlResult<Vec<Control>> {
    packet.description = "Controls".to_string();
    packet.children.iter_mut().map(decode_control).collect()
}

/// Wraps each control's encoding in the `[0] Controls` sequence of an LDAP
/// message.
pub fn encode_controls(controls: &[Control]) -> Packet {
    let mut packet = Packet::constructed(Class::Context, 0, "Controls");
    for control in controls {
        match control.encode() {
            Some(encoded) => packet.push(encoded),
            None => debug!(oid = control.oid(), "control has no request encoding, skipped"),
        }
    }
    packet
}

fn read_criticality(packet: &mut Packet) -> ControlResult<bool> {
    packet.description = "Criticality".to_string();
    packet
        .as_bool()
        .filter(|_| packet.is_universal(tag::BOOLEAN))
        .ok_or_else(|| ControlError::malformed("generic", "criticality is not a boolean"))
}

/// Builds the `Control` sequence: type, criticality when true, then value.
pub(crate) fn control_packet(oid: &str, criticality: bool, value: Option<Packet>) -> Packet {
    let mut packet =
        Packet::sequence("Control").with_child(Packet::string(oid, type_description(oid)));
    if criticality {
        packet.push(Packet::boolean(true, "Criticality"));
    }
    if let Some(value) = value {
        packet.push(value);
    }
    packet
}

/// Wraps an encoded value structure in the control value OCTET STRING.
pub(crate) fn control_value(name: &str, inner: Packet) -> Packet {
    Packet::octet_string(Vec::new(), format!("Control Value ({name})")).with_child(inner)
}

/// Unwraps the OCTET STRING value and returns the nested SEQUENCE.
pub(crate) fn nested_sequence<'p>(
    value: &'p mut Packet,
    control: &'static str,
    name: &str,
) -> ControlResult<&'p mut Packet> {
    value.description = format!("Control Value ({name})");
    let nested = value.unwrap_nested()?;
    if !nested.is_universal(tag::SEQUENCE) {
        return Err(ControlError::malformed(control, "value is not a sequence"));
    }
    Ok(nested)
}

/// Reads an INTEGER or ENUMERATED element of a value sequence.
pub(crate) fn integer_at(
    seq: &mut Packet,
    index: usize,
    control: &'static str,
    description: &str,
) -> ControlResult<i64> {
    let child = seq
        .children
        .get_mut(index)
        .ok_or_else(|| ControlError::malformed(control, format!("missing {description}")))?;
    child.description = description.to_string();
    if !(child.is_universal(tag::INTEGER) || child.is_universal(tag::ENUMERATED)) {
        return Err(ControlError::malformed(
            control,
            format!("{description} is not an integer"),
        ));
    }
    child
        .as_integer()
        .ok_or_else(|| ControlError::malformed(control, format!("{description} is out of range")))
}

/// Reads an OCTET STRING element of a value sequence.
pub(crate) fn bytes_at(
    seq: &mut Packet,
    index: usize,
    control: &'static str,
    description: &str,
) -> ControlResult<Vec<u8>> {
    let child = seq
        .children
        .get_mut(index)
        .ok_or_else(|| ControlError::malformed(control, format!("missing {description}")))?;
    child.description = description.to_string();
    if !child.is_universal(tag::OCTET_STRING) {
        return Err(ControlError::malformed(
            control,
            format!("{description} is not an octet string"),
        ));
    }
    Ok(child.content_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn decode_records_criticality_from_three_elements() {
        let mut packet = control_packet(
            "1.2.3.4",
            true,
            Some(Packet::octet_string(b"abc".to_vec(), "")),
        );
        let control = decode_control(&mut packet).unwrap();
        let raw = control.downcast_ref::<RawControl>().unwrap();
        assert!(raw.criticality);
        assert_eq!(raw.value.as_deref(), Some(&b"abc"[..]));
    }

    #[test]
    fn decode_two_elements_with_boolean_is_criticality() {
        let mut packet = control_packet("1.2.3.4", true, None);
        let control = decode_control(&mut packet).unwrap();
        let raw = control.downcast_ref::<RawControl>().unwrap();
        assert!(raw.criticality);
        assert_eq!(raw.value, None);
    }

    #[test]
    fn decode_annotates_packet() {
        let mut packet = PagingControl::new(10).encode();
        for child in &mut packet.children {
            child.description.clear();
        }
        decode_control(&mut packet).unwrap();
        assert_eq!(packet.children[0].description, "Control Type (Paging)");
        assert_eq!(packet.children[1].description, "Control Value (Paging)");
    }

    #[test]
    fn decode_rejects_empty_sequence() {
        let mut packet = Packet::sequence("");
        assert!(matches!(
            decode_control(&mut packet),
            Err(ControlError::Malformed { .. })
        ));
    }

    #[test]
    fn decode_rejects_non_string_type() {
        let mut packet = Packet::sequence("").with_child(Packet::integer(1, ""));
        assert!(matches!(
            decode_control(&mut packet),
            Err(ControlError::Malformed { .. })
        ));
    }

    #[test]
    fn encode_controls_skips_response_only_controls() {
        let controls = vec![
            Control::from(PagingControl::new(5)),
            Control::from(PasswordMustChangeControl::default()),
            Control::from(ShowDeletedControl::new()),
        ];
        let packet = encode_controls(&controls);
        assert_eq!(packet.class, Class::Context);
        assert_eq!(packet.tag, 0);
        assert_eq!(packet.children.len(), 2);
    }

    #[test]
    fn decode_controls_reads_every_child() {
        let controls = vec![
            Control::from(PagingControl::new(5)),
            Control::from(DirSyncExControl::new(1)),
        ];
        let bytes = encode_controls(&controls).encode();
        let mut packet = Packet::decode(&bytes).unwrap();
        let decoded = decode_controls(&mut packet).unwrap();
        assert_eq!(decoded, controls);
    }

    #[test]
    fn downcast_reports_mismatch() {
        let control = Control::from(RawControl::new(oid::DIRSYNC, false, None));
        assert_eq!(
            control.downcast_ref::<DirSyncControl>(),
            Err(ControlError::TypeMismatch {
                expected: ControlKind::DirSync,
                actual: ControlKind::Raw,
            })
        );
    }

    #[test]
    fn expect_control_distinguishes_missing_and_mismatched() {
        let controls = vec![Control::from(PagingControl::new(1))];
        assert_eq!(
            expect_control::<DirSyncControl>(&controls),
            Err(ControlError::NotFound { oid: oid::DIRSYNC })
        );

        let controls = vec![Control::from(RawControl::new(oid::DIRSYNC, true, None))];
        assert!(matches!(
            expect_control::<DirSyncControl>(&controls),
            Err(ControlError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn expect_control_finds_raw_controls_by_variant() {
        let raw = RawControl::new("1.3.6.1.4.1.99999.1", false, Some(vec![1]));
        let mut controls = vec![
            Control::from(PagingControl::new(1)),
            Control::from(raw.clone()),
        ];
        assert_eq!(expect_control::<RawControl>(&controls), Ok(&raw));

        expect_control_mut::<RawControl>(&mut controls)
            .unwrap()
            .criticality = true;
        assert!(expect_control::<RawControl>(&controls).unwrap().criticality);

        let controls = vec![Control::from(PagingControl::new(1))];
        assert_eq!(
            expect_control::<RawControl>(&controls),
            Err(ControlError::NotFound { oid: "Generic" })
        );
    }

    #[test]
    fn expect_control_mut_allows_in_place_update() {
        let mut controls = vec![
            Control::from(DirSyncControl::new(0, 1000, Vec::new())),
            Control::from(DirSyncExControl::new(1)),
        ];
        expect_control_mut::<DirSyncControl>(&mut controls)
            .unwrap()
            .set_cookie(b"next".to_vec());
        let dirsync = expect_control::<DirSyncControl>(&controls).unwrap();
        assert_eq!(dirsync.cookie, b"next".to_vec());
    }
}
