#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod auth;
pub mod channel;
pub(crate) mod connect;
pub mod control;
pub mod error;
pub mod io;
pub(crate) mod mount;
pub mod net;
pub(crate) mod nfs;
pub(crate) mod portmapper;
pub mod privileged_port;
pub mod rpc;
pub mod source_route;
pub mod tokio;
pub mod udp;

pub use connect::*;
pub use mount::*;
pub use nfs::*;
/// Re-export of `nfs3_types` for convenience
pub use nfs3_types;
pub use portmapper::*;
