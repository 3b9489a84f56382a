//! Datagram RPC transport.
//!
//! UDP has no record marking: each request and reply is exactly one
//! datagram, matched by XID, retried with a backoff when nothing comes
//! back before resending makes more sense than continuing to wait.

use std::time::Duration;

use nfs3_types::rpc::{
    RPC_VERSION_2, accept_stat_data, call_body, msg_body, opaque_auth, reply_body, rpc_msg,
};
use nfs3_types::xdr_codec::{Pack, Unpack};
use tokio::net::UdpSocket;

use crate::control::ChannelControl;
use crate::error::{Error, RpcError};

const INITIAL_TIMEOUT: Duration = Duration::from_millis(500);
const MAX_RETRIES: u32 = 5;
const MAX_DATAGRAM: usize = 64 * 1024;

/// RPC client over UDP, with retransmission on timeout.
pub struct UdpRpcClient {
    socket: UdpSocket,
    xid: u32,
    credential: opaque_auth<'static>,
    verifier: opaque_auth<'static>,
    control: ChannelControl,
}

impl UdpRpcClient {
    pub fn new(socket: UdpSocket) -> Self {
        Self::new_with_auth(socket, opaque_auth::default(), opaque_auth::default())
    }

    pub fn new_with_auth(
        socket: UdpSocket,
        credential: opaque_auth<'static>,
        verifier: opaque_auth<'static>,
    ) -> Self {
        Self::new_with_control(socket, credential, verifier, ChannelControl::default())
    }

    /// Create a new UDP RPC client with custom credential, verifier, and
    /// call-timeout/cancellation controls. The retransmission backoff below
    /// still governs individual retries; `control.timeout` bounds the whole
    /// call, retries included.
    pub fn new_with_control(
        socket: UdpSocket,
        credential: opaque_auth<'static>,
        verifier: opaque_auth<'static>,
        control: ChannelControl,
    ) -> Self {
        Self {
            socket,
            xid: rand::random(),
            credential,
            verifier,
            control,
        }
    }

    /// Call an RPC procedure, retransmitting the request with an
    /// exponentially growing timeout until a reply with the matching XID
    /// arrives or the retry budget is exhausted.
    #[allow(clippy::similar_names)]
    pub async fn call<C, R>(&mut self, prog: u32, vers: u32, proc: u32, args: &C) -> Result<R, Error>
    where
        R: Unpack,
        C: Pack,
    {
        let call = call_body {
            rpcvers: RPC_VERSION_2,
            prog,
            vers,
            proc,
            cred: self.credential.borrow(),
            verf: self.verifier.borrow(),
        };
        let msg = rpc_msg {
            xid: self.xid,
            body: msg_body::CALL(call),
        };
        self.xid = self.xid.wrapping_add(1);

        let mut buf = Vec::with_capacity(msg.packed_size() + args.packed_size());
        msg.pack(&mut buf)?;
        args.pack(&mut buf)?;

        let overall_timeout = self.control.timeout;
        let cancel = self.control.cancel_token();
        let socket = &self.socket;
        let attempts = async {
            let mut timeout = INITIAL_TIMEOUT;
            for attempt in 0..=MAX_RETRIES {
                socket.send(&buf).await?;

                let mut recv_buf = vec![0u8; MAX_DATAGRAM];
                match tokio::time::timeout(timeout, socket.recv(&mut recv_buf)).await {
                    Ok(Ok(n)) => {
                        recv_buf.truncate(n);
                        match Self::parse_reply::<R>(&recv_buf, msg.xid) {
                            Ok(value) => return Ok(value),
                            Err(Error::Rpc(RpcError::UnexpectedXid)) => continue,
                            Err(e) => return Err(e),
                        }
                    }
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_elapsed) => {
                        if attempt == MAX_RETRIES {
                            return Err(Error::Timeout);
                        }
                        timeout *= 2;
                    }
                }
            }
            Err(Error::Timeout)
        };

        tokio::select! {
            res = tokio::time::timeout(overall_timeout, attempts) => res.unwrap_or(Err(Error::Timeout)),
            () = cancel.cancelled() => Err(Error::Cancelled),
        }
    }

    fn parse_reply<T>(buf: &[u8], xid: u32) -> Result<T, Error>
    where
        T: Unpack,
    {
        let mut cursor = std::io::Cursor::new(buf.to_vec());
        let (resp_msg, _) = rpc_msg::unpack(&mut cursor)?;

        if resp_msg.xid != xid {
            return Err(RpcError::UnexpectedXid.into());
        }

        let reply = match resp_msg.body {
            msg_body::REPLY(reply_body::MSG_ACCEPTED(reply)) => reply,
            msg_body::REPLY(reply_body::MSG_DENIED(r)) => return Err(r.into()),
            msg_body::CALL(_) => return Err(RpcError::UnexpectedCall.into()),
        };

        if !matches!(reply.reply_data, accept_stat_data::SUCCESS) {
            return Err(RpcError::try_from(reply.reply_data)
                .unwrap_or(RpcError::SystemErr)
                .into());
        }

        let (value, _) = T::unpack(&mut cursor)?;
        Ok(value)
    }
}
