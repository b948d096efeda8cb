//! Types command implementation.

use ldapsync_controls::CONTROL_TYPES;
use serde::Serialize;

/// Registry row representation for output.
#[derive(Debug, Serialize)]
pub struct ControlTypeInfo {
    /// Control OID.
    pub oid: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Variant decoded for the OID.
    pub kind: String,
}

/// Runs the types command.
pub fn run(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let types: Vec<ControlTypeInfo> = CONTROL_TYPES
        .iter()
        .map(|t| ControlTypeInfo {
            oid: t.oid,
            name: t.name,
            kind: t.kind.to_string(),
        })
        .collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&types)?);
        }
        _ => {
            println!("{:<28} {:<20} Name", "OID", "Kind");
            for t in &types {
                println!("{:<28} {:<20} {}", t.oid, t.kind, t.name);
            }
        }
    }

    Ok(())
}
