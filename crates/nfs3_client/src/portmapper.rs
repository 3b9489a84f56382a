use nfs3_types::portmap::{PMAP_PROG, PROGRAM, VERSION, call_args, call_result, mapping, pmaplist};
use nfs3_types::xdr_codec::{Opaque, Pack, Unpack, Void};

use crate::control::ChannelControl;
use crate::io::{AsyncRead, AsyncWrite};
use crate::rpc::RpcClient;

/// Client for the portmapper service
#[derive(Debug)]
pub struct PortmapperClient<IO> {
    rpc: RpcClient<IO>,
}

impl<IO> PortmapperClient<IO>
where
    IO: AsyncRead + AsyncWrite + Send,
{
    pub fn new(io: IO) -> Self {
        Self {
            rpc: RpcClient::new(io),
        }
    }

    /// Create a new portmapper client with call-timeout/cancellation
    /// controls shared with the rest of the session.
    pub fn new_with_control(io: IO, control: ChannelControl) -> Self {
        Self {
            rpc: RpcClient::new_with_control(
                io,
                nfs3_types::rpc::opaque_auth::default(),
                nfs3_types::rpc::opaque_auth::default(),
                control,
            ),
        }
    }

    pub async fn null(&mut self) -> Result<(), crate::error::Error> {
        let _ = self
            .call::<Void, Void>(PMAP_PROG::PMAPPROC_NULL, Void)
            .await?;
        Ok(())
    }

    pub async fn getport(&mut self, prog: u32, vers: u32) -> Result<u16, crate::error::Error> {
        let args = mapping {
            prog,
            vers,
            prot: nfs3_types::portmap::IPPROTO_TCP,
            port: 0,
        };

        let port = self
            .call::<mapping, u32>(PMAP_PROG::PMAPPROC_GETPORT, args)
            .await?;

        let port_u16: Result<u16, _> = port.try_into();
        match port_u16 {
            Ok(0) => Err(crate::error::PortmapError::ProgramUnavailable.into()),
            Ok(port) => Ok(port),
            Err(_) => Err(crate::error::PortmapError::InvalidPortValue(port).into()),
        }
    }

    pub async fn dump(&mut self) -> Result<Vec<mapping>, crate::error::Error> {
        let mappings = self
            .call::<Void, pmaplist>(PMAP_PROG::PMAPPROC_DUMP, Void)
            .await?;
        Ok(mappings.0)
    }

    /// Relay a call to another program through the portmapper, using its
    /// `PMAPPROC_CALLIT` indirection. Some MOUNT3 servers answer only this
    /// way when their mount daemon isn't separately registered.
    ///
    /// Unlike direct calls, `CALLIT` always replies over UDP regardless of
    /// the transport this client was built on, and wraps the callee's
    /// reply bytes as opaque data rather than a typed result.
    pub async fn callit(
        &mut self,
        prog: u32,
        vers: u32,
        proc: u32,
        args: &[u8],
    ) -> Result<(u16, Vec<u8>), crate::error::Error> {
        let call_args = call_args {
            prog,
            vers,
            proc,
            args: Opaque::borrowed(args),
        };
        let result = self
            .call::<call_args<'_>, call_result<'_>>(PMAP_PROG::PMAPPROC_CALLIT, call_args)
            .await?;
        let port_u16: Result<u16, _> = result.port.try_into();
        let port = port_u16.map_err(|_| crate::error::PortmapError::InvalidPortValue(result.port))?;
        Ok((port, result.res.to_vec()))
    }

    async fn call<C, R>(&mut self, proc: PMAP_PROG, args: C) -> Result<R, crate::error::Error>
    where
        R: Unpack,
        C: Pack,
    {
        self.rpc
            .call::<C, R>(PROGRAM, VERSION, proc as u32, &args)
            .await
    }
}
