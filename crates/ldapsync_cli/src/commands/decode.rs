//! Decode command implementation.

use ldapsync_ber::Packet;
use ldapsync_controls::{decode_control, decode_controls, Control, ControlError};
use serde::Serialize;
use serde_json::{json, Value};

/// Decoded control representation for output.
#[derive(Debug, Serialize)]
pub struct ControlInfo {
    /// Control type OID.
    pub oid: String,
    /// Registered name, or "Generic".
    pub name: String,
    /// Variant decoded for the OID.
    pub kind: String,
    /// Variant fields. Byte strings are hex-encoded.
    pub fields: Value,
}

impl ControlInfo {
    /// Builds the output record for a control.
    pub fn from_control(control: &Control) -> Self {
        Self {
            oid: control.oid().to_string(),
            name: control.kind().name().to_string(),
            kind: control.kind().to_string(),
            fields: control_fields(control),
        }
    }
}

/// Runs the decode command.
pub fn run(input: &str, tree: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = parse_hex(input)?;
    let mut packet = Packet::decode(&bytes)?;
    let controls = decode_packet(&mut packet)?;
    let infos: Vec<ControlInfo> = controls.iter().map(ControlInfo::from_control).collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        _ => {
            for control in &controls {
                println!("{control}");
            }
        }
    }

    if tree {
        print!("{packet}");
    }

    Ok(())
}

/// Parses hex input, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    hex::decode(cleaned)
}

/// Decodes either a single `Control` or a `[0] Controls` sequence.
pub fn decode_packet(packet: &mut Packet) -> Result<Vec<Control>, ControlError> {
    if packet.is_context(0) && packet.is_constructed() {
        decode_controls(packet)
    } else {
        Ok(vec![decode_control(packet)?])
    }
}

fn control_fields(control: &Control) -> Value {
    match control {
        Control::Paging(c) => json!({
            "paging_size": c.paging_size,
            "cookie": hex::encode(&c.cookie),
        }),
        Control::BeheraPasswordPolicy(c) => json!({
            "expire": c.expire,
            "grace": c.grace,
            "error": c.error,
            "error_string": c.error_string,
        }),
        Control::PasswordMustChange(c) => json!({ "must_change": c.must_change }),
        Control::PasswordWarning(c) => json!({ "expire": c.expire }),
        Control::ChangeNotify(c) => json!({
            "criticality": c.criticality,
            "cookie": hex::encode(&c.cookie),
        }),
        Control::ContentSync(c) => json!({
            "mode": c.mode.to_string(),
            "cookie": c.cookie.as_ref().map(hex::encode),
            "reload_hint": c.reload_hint,
        }),
        Control::ContentSyncState(c) => json!({
            "state": c.state.to_string(),
            "uuid": c
                .entry_uuid()
                .map_or_else(|| hex::encode(&c.uuid), |u| u.to_string()),
            "cookie": c.cookie.as_ref().map(hex::encode),
        }),
        Control::ContentSyncDone(c) => json!({
            "cookie": c.cookie.as_ref().map(hex::encode),
            "refresh_deletes": c.refresh_deletes,
        }),
        Control::DirSync(c) => json!({
            "criticality": c.criticality,
            "flags": c.flags,
            "max_attribute_count": c.max_attribute_count,
            "cookie": hex::encode(&c.cookie),
        }),
        Control::DirSyncEx(c) => json!({ "flag": c.flag }),
        Control::ShowDeleted(c) => json!({ "criticality": c.criticality }),
        Control::Raw(c) => json!({
            "criticality": c.criticality,
            "value": c.value.as_ref().map(hex::encode),
        }),
    }
}
