//! Shell-level error type and NFS status message table.

use std::fmt;

use nfs3_types::nfs3::nfsstat3;

#[derive(Debug)]
pub enum ShellError {
    /// Something went wrong in the RPC engine: transport, codec, or a
    /// non-OK MOUNT/NFS status.
    Client(nfs3_client::error::Error),
    /// Local file I/O failed (`get`/`put`/`lcd`).
    Io(std::io::Error),
    /// The command line itself didn't make sense: wrong arity, a path that
    /// doesn't resolve, a value out of range.
    Usage(String),
    /// Attempted an operation that requires a state the session isn't in
    /// (e.g. `ls` before `mount`).
    NotReady(&'static str),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
            Self::Usage(msg) => write!(f, "{msg}"),
            Self::NotReady(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<nfs3_client::error::Error> for ShellError {
    fn from(e: nfs3_client::error::Error) -> Self {
        Self::Client(e)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Render an `nfsstat3` the way the original client's static string table
/// did, for error messages shown to the user.
pub fn describe_nfsstat3(stat: nfsstat3) -> &'static str {
    match stat {
        nfsstat3::NFS3_OK => "No error",
        nfsstat3::NFS3ERR_PERM => "Not owner",
        nfsstat3::NFS3ERR_NOENT => "No such file or directory",
        nfsstat3::NFS3ERR_IO => "I/O error",
        nfsstat3::NFS3ERR_NXIO => "No such device or address",
        nfsstat3::NFS3ERR_ACCES => "Permission denied",
        nfsstat3::NFS3ERR_EXIST => "File exists",
        nfsstat3::NFS3ERR_XDEV => "Cross-device link",
        nfsstat3::NFS3ERR_NODEV => "No such device",
        nfsstat3::NFS3ERR_NOTDIR => "Not a directory",
        nfsstat3::NFS3ERR_ISDIR => "Is a directory",
        nfsstat3::NFS3ERR_INVAL => "Invalid argument",
        nfsstat3::NFS3ERR_FBIG => "File too large",
        nfsstat3::NFS3ERR_NOSPC => "No space left on device",
        nfsstat3::NFS3ERR_ROFS => "Read-only file system",
        nfsstat3::NFS3ERR_MLINK => "Too many links",
        nfsstat3::NFS3ERR_NAMETOOLONG => "File name too long",
        nfsstat3::NFS3ERR_NOTEMPTY => "Directory not empty",
        nfsstat3::NFS3ERR_DQUOT => "Disc quota exceeded",
        nfsstat3::NFS3ERR_STALE => "Stale NFS file handle",
        nfsstat3::NFS3ERR_REMOTE => "Too many levels of remote in path",
        nfsstat3::NFS3ERR_BADHANDLE => "Illegal NFS file handle",
        nfsstat3::NFS3ERR_NOT_SYNC => "Update synchronization mismatch",
        nfsstat3::NFS3ERR_BAD_COOKIE => "READDIR/READDIRPLUS cookie is stale",
        nfsstat3::NFS3ERR_NOTSUPP => "Operation is not supported",
        nfsstat3::NFS3ERR_TOOSMALL => "Buffer or request is too small",
        nfsstat3::NFS3ERR_SERVERFAULT => "An error occurred on the server",
        nfsstat3::NFS3ERR_BADTYPE => "Type not supported by the server",
        nfsstat3::NFS3ERR_JUKEBOX => "Slow to respond, try again later",
    }
}
