//! Encode command implementation.

use clap::Subcommand;
use ldapsync_ber::Packet;
use ldapsync_controls::{
    encode_controls, ChangeNotifyControl, ContentSyncControl, ContentSyncMode, DirSyncExControl,
    PagingControl, ShowDeletedControl,
};
use ldapsync_engine::{ContentSyncConfig, DirSyncConfig};

/// Controls the encode command can build.
#[derive(Debug, Subcommand)]
pub enum EncodeTarget {
    /// Simple paged results
    Paging {
        /// Page size
        #[arg(short, long, default_value = "1000")]
        size: u32,

        /// Hex-encoded continuation cookie
        #[arg(short, long)]
        cookie: Option<String>,
    },

    /// Content sync request
    ContentSync {
        /// Request refreshOnly instead of refreshAndPersist
        #[arg(long)]
        refresh_only: bool,

        /// Hex-encoded resume cookie
        #[arg(short, long)]
        cookie: Option<String>,
    },

    /// DirSync and extended DN request controls, as sent by a DirSync session
    Dirsync {
        /// DirSync flags
        #[arg(long, default_value = "0")]
        flags: u64,

        /// Maximum attribute count
        #[arg(long, default_value = "1000")]
        max_attributes: u64,

        /// Hex-encoded resume cookie
        #[arg(short, long)]
        cookie: Option<String>,
    },

    /// Extended DN request control
    DirsyncEx {
        /// Extended DN flag
        #[arg(long, default_value = "1")]
        flag: u64,
    },

    /// Change notification request control
    ChangeNotify {
        /// Hex-encoded cookie
        #[arg(short, long)]
        cookie: Option<String>,
    },

    /// Show deleted objects control
    ShowDeleted,
}

/// Runs the encode command.
pub fn run(target: EncodeTarget, tree: bool) -> Result<(), Box<dyn std::error::Error>> {
    let packet = build(target)?;
    println!("{}", hex::encode(packet.encode()));
    if tree {
        print!("{packet}");
    }
    Ok(())
}

/// Builds the packet for a target. DirSync produces a `[0] Controls`
/// sequence holding both controls; the others produce a single control.
pub fn build(target: EncodeTarget) -> Result<Packet, Box<dyn std::error::Error>> {
    let packet = match target {
        EncodeTarget::Paging { size, cookie } => {
            let mut control = PagingControl::new(size);
            control.set_cookie(cookie_bytes(cookie)?.unwrap_or_default());
            control.encode()
        }
        EncodeTarget::ContentSync {
            refresh_only,
            cookie,
        } => {
            let mode = if refresh_only {
                ContentSyncMode::RefreshOnly
            } else {
                ContentSyncMode::RefreshAndPersist
            };
            let request = ContentSyncConfig::new()
                .with_mode(mode)
                .request("", "(objectclass=*)", cookie_bytes(cookie)?);
            let control = request.control::<ContentSyncControl>()?;
            control.encode()
        }
        EncodeTarget::Dirsync {
            flags,
            max_attributes,
            cookie,
        } => {
            let request = DirSyncConfig::new()
                .with_flags(flags)
                .with_max_attribute_count(max_attributes)
                .request("", cookie_bytes(cookie)?.unwrap_or_default());
            encode_controls(&request.controls)
        }
        EncodeTarget::DirsyncEx { flag } => DirSyncExControl::new(flag).encode(),
        EncodeTarget::ChangeNotify { cookie } => {
            let mut control = ChangeNotifyControl::new();
            control.set_cookie(cookie_bytes(cookie)?.unwrap_or_default());
            control.encode()
        }
        EncodeTarget::ShowDeleted => ShowDeletedControl::new().encode(),
    };
    Ok(packet)
}

fn cookie_bytes(cookie: Option<String>) -> Result<Option<Vec<u8>>, hex::FromHexError> {
    cookie.map(hex::decode).transpose()
}
