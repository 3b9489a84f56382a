//! AUTH_UNIX credential construction.
//!
//! Builds the `opaque_auth` RPC credential carrying a machine name, uid,
//! gid, and auxiliary group list, encoded per RFC 5531 §8.2.

use std::time::{SystemTime, UNIX_EPOCH};

use nfs3_types::rpc::{auth_flavor, auth_unix, opaque_auth};
use nfs3_types::xdr_codec::{Opaque, Pack};

/// Longest `machinename` the wire format allows.
const MAX_MACHINENAME_LEN: usize = 255;

/// Caller-chosen identity to present via AUTH_UNIX.
#[derive(Debug, Clone)]
pub struct UnixCredential {
    pub uid: u32,
    pub gid: u32,
    pub gids: Vec<u32>,
    pub machinename: String,
}

impl UnixCredential {
    /// Build a credential for an explicit uid/gid/aux-gids, using the local
    /// hostname as the machine name.
    pub fn new(uid: u32, gid: u32, gids: Vec<u32>) -> Self {
        let machinename = hostname();
        Self {
            uid,
            gid,
            gids,
            machinename,
        }
    }

    /// Encode as the `opaque_auth` carried in every subsequent RPC call.
    pub fn to_opaque_auth(&self) -> opaque_auth<'static> {
        let mut name = self.machinename.clone().into_bytes();
        name.truncate(MAX_MACHINENAME_LEN);
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
            .unwrap_or(0);
        let unix = auth_unix {
            stamp,
            machinename: Opaque::owned(name),
            uid: self.uid,
            gid: self.gid,
            gids: self.gids.clone(),
        };
        let mut body = Vec::new();
        unix.pack(&mut body).expect("auth_unix packing is infallible for a Vec sink");
        opaque_auth {
            flavor: auth_flavor::AUTH_UNIX,
            body: Opaque::owned(body),
        }
    }
}

fn hostname() -> String {
    nix_gethostname().unwrap_or_else(|| "localhost".to_string())
}

#[cfg(unix)]
fn nix_gethostname() -> Option<String> {
    let mut buf = vec![0u8; 256];
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if ret != 0 {
        return None;
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    buf.truncate(len);
    String::from_utf8(buf).ok()
}

#[cfg(not(unix))]
fn nix_gethostname() -> Option<String> {
    None
}
