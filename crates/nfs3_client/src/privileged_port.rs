//! Acquisition of a privileged (< 1024) local TCP/UDP port.
//!
//! Traditional NFS servers trust AUTH_UNIX credentials only when the request
//! arrives from a reserved port, so an NFS client historically binds its
//! local socket somewhere in 1023..=512 before connecting. We probe that
//! range top-down and accept the first port the kernel lets us bind.

use socket2::{Domain, Socket, Type};

use crate::error::Error;

const HIGHEST_RESERVED_PORT: u16 = 1023;
const LOWEST_RESERVED_PORT: u16 = 512;

/// Try to bind a UDP or TCP socket to a descending sequence of reserved
/// ports, returning the first one that succeeds.
///
/// `EADDRINUSE`/`EADDRNOTAVAIL` are tried past; any other OS error aborts
/// the search immediately, since it means something more fundamental than
/// "this one port is busy".
pub fn bind_reserved(domain: Domain, ty: Type) -> Result<Socket, Error> {
    let mut last_err = None;
    for port in (LOWEST_RESERVED_PORT..=HIGHEST_RESERVED_PORT).rev() {
        let socket = Socket::new(domain, ty, None)
            .map_err(|e| Error::Resource(format!("failed to create socket: {e}")))?;
        let addr = std::net::SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, port));
        match socket.bind(&addr.into()) {
            Ok(()) => return Ok(socket),
            Err(e)
                if matches!(
                    e.raw_os_error(),
                    Some(libc::EADDRINUSE) | Some(libc::EADDRNOTAVAIL)
                ) =>
            {
                last_err = Some(e);
                continue;
            }
            Err(e) => {
                return Err(Error::Resource(format!(
                    "failed to bind reserved port {port}: {e}"
                )));
            }
        }
    }
    Err(Error::Resource(format!(
        "no reserved port available in {LOWEST_RESERVED_PORT}..={HIGHEST_RESERVED_PORT}: {}",
        last_err.map_or_else(|| "all in use".to_string(), |e| e.to_string())
    )))
}

/// Bind a reserved TCP port and return the chosen port number, releasing the
/// probe socket so a connector can rebind it for the real connection.
///
/// We can't hold the bound socket open and hand it to an async connector
/// (tokio wants to create its own), so we bind, read back the port, and drop
/// the socket; there's a small race where another process could steal the
/// port between our probe and the real bind, but this mirrors the original
/// reserved-port client behavior, which has the same race.
pub fn acquire_reserved_tcp_port() -> Result<u16, Error> {
    let socket = bind_reserved(Domain::IPV4, Type::STREAM)?;
    let addr = socket
        .local_addr()
        .map_err(|e| Error::Resource(format!("failed to read bound local address: {e}")))?;
    addr.as_socket()
        .map(|a| a.port())
        .ok_or_else(|| Error::Resource("bound address was not IPv4/IPv6".to_string()))
}

/// Bind a reserved UDP port and return the live socket, since UDP transport
/// uses the socket directly rather than handing it to a stream connector.
pub fn acquire_reserved_udp_socket() -> Result<Socket, Error> {
    bind_reserved(Domain::IPV4, Type::DGRAM)
}
