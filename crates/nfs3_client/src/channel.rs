//! Transport-agnostic RPC call surface.
//!
//! `Session` (in `nfs3sh`) doesn't want to know whether a given program is
//! being spoken to over TCP or UDP; `RpcChannel` erases that choice behind
//! one `call` method.

use std::io::Cursor;

use nfs3_types::xdr_codec::{Pack, PackedSize, Unpack};

use crate::error::Error;
use crate::io::{AsyncRead, AsyncWrite};
use crate::rpc::RpcClient;
use crate::udp::UdpRpcClient;

/// Either a TCP (record-marked, reliable) or UDP (datagram, retransmitted)
/// connection to an ONC-RPC program.
pub enum RpcChannel<IO> {
    Tcp(RpcClient<IO>),
    Udp(UdpRpcClient),
}

impl<IO> RpcChannel<IO>
where
    IO: AsyncRead + AsyncWrite + Send,
{
    pub async fn call<C, R>(&mut self, prog: u32, vers: u32, proc: u32, args: &C) -> Result<R, Error>
    where
        R: Unpack<Cursor<Vec<u8>>>,
        C: Pack<Vec<u8>> + PackedSize,
    {
        match self {
            Self::Tcp(rpc) => rpc.call(prog, vers, proc, args).await,
            Self::Udp(rpc) => rpc.call(prog, vers, proc, args).await,
        }
    }
}
