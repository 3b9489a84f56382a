//! IP loose source routing (LSRR), for reaching a server through a chain of
//! intermediate gateways.
//!
//! A route is written out as an IPv4 options buffer and applied to a raw fd
//! via `setsockopt(IPPROTO_IP, IP_OPTIONS, ...)` before the socket connects.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::os::fd::AsRawFd;

use crate::error::Error;

const IPOPT_LSRR: u8 = 0x83;
const IPOPT_MINOFF: u8 = 4;
const MAX_HOPS: usize = 8;

/// A loose source route: a chain of intermediate gateway addresses ending at
/// the real destination, parsed from a `host1,host2,...,dest` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoute {
    hops: Vec<Ipv4Addr>,
}

impl SourceRoute {
    /// Parse a comma-separated list of dotted-quad or resolvable hostnames.
    ///
    /// Hostname resolution happens eagerly and synchronously, matching how
    /// the rest of the option-building step needs concrete addresses before
    /// it can lay out the IP options buffer.
    pub fn parse(expr: &str) -> Result<Self, Error> {
        let mut hops = Vec::new();
        for hop in expr.split(',') {
            let hop = hop.trim();
            if hop.is_empty() {
                return Err(Error::SourceRoute(format!(
                    "empty hop in source route '{expr}'"
                )));
            }
            let addr = resolve_ipv4(hop)
                .ok_or_else(|| Error::SourceRoute(format!("could not resolve hop '{hop}'")))?;
            hops.push(addr);
        }
        if hops.is_empty() {
            return Err(Error::SourceRoute("source route has no hops".to_string()));
        }
        if hops.len() > MAX_HOPS {
            return Err(Error::SourceRoute(format!(
                "source route has {} hops, maximum is {MAX_HOPS}",
                hops.len()
            )));
        }
        Ok(Self { hops })
    }

    /// Final destination of the route: the last hop in the chain.
    pub fn destination(&self) -> Ipv4Addr {
        self.hops[self.hops.len() - 1]
    }

    /// Build the IPv4 options buffer: option type, length, pointer, then the
    /// hop list (destination last), padded to a 4-byte boundary.
    fn build_option_bytes(&self) -> Vec<u8> {
        let route_len = self.hops.len() * 4;
        let opt_len = 3 + route_len;
        let mut buf = Vec::with_capacity(opt_len + 3);
        buf.push(IPOPT_LSRR);
        #[allow(clippy::cast_possible_truncation)]
        buf.push(opt_len as u8);
        buf.push(IPOPT_MINOFF);
        for hop in &self.hops {
            buf.extend_from_slice(&hop.octets());
        }
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
        buf
    }

    /// Apply this route to a raw socket via `IP_OPTIONS`, so all subsequent
    /// traffic on the connection is source-routed through the given hops.
    pub fn apply(&self, socket: &impl AsRawFd) -> Result<(), Error> {
        let opts = self.build_option_bytes();
        let ret = unsafe {
            libc::setsockopt(
                socket.as_raw_fd(),
                libc::IPPROTO_IP,
                libc::IP_OPTIONS,
                opts.as_ptr().cast(),
                u32::try_from(opts.len()).unwrap_or(u32::MAX),
            )
        };
        if ret != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

fn resolve_ipv4(host: &str) -> Option<Ipv4Addr> {
    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Some(addr);
    }
    use std::net::ToSocketAddrs;
    (host, 0u16)
        .to_socket_addrs()
        .ok()?
        .find_map(|addr| match addr {
            std::net::SocketAddr::V4(SocketAddrV4 { .. }) => {
                if let std::net::SocketAddr::V4(v4) = addr {
                    Some(*v4.ip())
                } else {
                    None
                }
            }
            std::net::SocketAddr::V6(_) => None,
        })
}

#[cfg(test)]
mod tests {
    use super::SourceRoute;

    #[test]
    fn parses_dotted_quads() {
        let route = SourceRoute::parse("10.0.0.1,10.0.0.2,192.168.1.1").unwrap();
        assert_eq!(route.destination(), "192.168.1.1".parse().unwrap());
    }

    #[test]
    fn rejects_empty_route() {
        assert!(SourceRoute::parse("").is_err());
    }

    #[test]
    fn rejects_too_many_hops() {
        let expr = (0..10)
            .map(|i| format!("10.0.0.{i}"))
            .collect::<Vec<_>>()
            .join(",");
        assert!(SourceRoute::parse(&expr).is_err());
    }

    #[test]
    fn option_bytes_are_word_aligned() {
        let route = SourceRoute::parse("10.0.0.1,10.0.0.2").unwrap();
        assert_eq!(route.build_option_bytes().len() % 4, 0);
    }
}
