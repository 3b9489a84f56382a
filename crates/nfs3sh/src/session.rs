//! Session state machine: `Empty` -> `HostBound` -> `Mounted`.
//!
//! Each state carries only the fields that are actually valid in it, so
//! accessing (say) a current directory handle while no filesystem is
//! mounted is a compile error rather than an `Option::unwrap` away from a
//! panic.

use std::fmt;
use std::net::ToSocketAddrs;

use nfs3_client::auth::UnixCredential;
use nfs3_client::control::{CancelCell, ChannelControl, DEFAULT_TIMEOUT};
use nfs3_client::net::Connector;
use nfs3_client::source_route::SourceRoute;
use nfs3_client::tokio::{TokioConnector, TokioIo};
use nfs3_client::{MountClient, Nfs3Client};
use nfs3_types::mount::dirpath;
use nfs3_types::nfs3::{FSINFO3args, Nfs3Result, nfs_fh3};
use nfs3_types::xdr_codec::{Opaque, Pack, Unpack};
use tokio::net::TcpStream;

use crate::errors::ShellError;

pub type NfsIo = TokioIo<TcpStream>;

/// Fallback transfer size used only until a session has actually negotiated
/// one with the server via FSINFO.
const DEFAULT_CHUNK: u32 = 65536;

/// Raw NFSv3 file handle, the one piece of server-issued state a client
/// must carry between calls.
#[derive(Clone, Eq, PartialEq)]
pub struct Handle(pub Vec<u8>);

impl Handle {
    pub fn from_nfs_fh3(fh: &nfs_fh3) -> Self {
        Self(fh.data.to_vec())
    }

    pub fn to_nfs_fh3(&self) -> nfs_fh3 {
        nfs_fh3 {
            data: Opaque::owned(self.0.clone()),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({self})")
    }
}

/// A single directory entry accumulated from one or more READDIR replies.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub fileid: nfs3_types::nfs3::fileid3,
}

/// Transport chosen for the NFS data channel, set by `mount -T`/`-U`.
/// Left unset (`Auto`), a TCP attempt that fails falls back to UDP, the way
/// `mount` with neither flag behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Auto,
    Tcp,
    Udp,
}

/// Extra knobs `mount -upP` (and `handle -TUP`) expose, layered over the
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct MountOptions {
    /// `-P port`: use this NFS server port instead of asking the portmapper.
    pub nfs_port_override: Option<u16>,
    /// `-u`: unmount again immediately after a successful mount.
    pub unmount_after: bool,
    /// `-p`: reach the mount daemon indirectly through the portmapper's
    /// `CALLIT` relay instead of connecting to it directly. Mutually
    /// exclusive with `unmount_after` -- there's no bookkeeping entry to
    /// drop when the call never opened its own connection.
    pub thru_portmap: bool,
}

/// Credentials the session presents to the server; rebuilt whenever `uid`
/// or `gid` changes.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            uid: u32::MAX - 1,
            gid: u32::MAX - 1,
        }
    }
}

impl Identity {
    fn credential(&self) -> UnixCredential {
        UnixCredential::new(self.uid, self.gid, vec![self.gid])
    }
}

/// The session's current state. Transitions only ever move forward
/// (`Empty` -> `HostBound` -> `Mounted`) or backward by exactly one step
/// (`umount`, `host` while mounted drops back to `Empty`).
pub enum Session {
    Empty {
        identity: Identity,
        cancel: CancelCell,
    },
    HostBound {
        host: String,
        identity: Identity,
        /// Set by a `host [localaddr]@hop1:hop2:...:dest` invocation; consumed
        /// by the next `mount` to source-route the mount daemon connection.
        source_route: Option<(Option<String>, SourceRoute)>,
        cancel: CancelCell,
    },
    Mounted {
        host: String,
        identity: Identity,
        nfs: Nfs3Client<NfsIo>,
        root: Handle,
        cwd: Handle,
        cwd_path: String,
        /// Server-advertised maximum READ count, from FSINFO.
        rtmax: u32,
        /// Server-advertised maximum WRITE count, from FSINFO.
        wtmax: u32,
        cancel: CancelCell,
    },
}

impl Session {
    pub fn new() -> Self {
        Self::Empty {
            identity: Identity::default(),
            cancel: CancelCell::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        match self {
            Self::Empty { identity, .. }
            | Self::HostBound { identity, .. }
            | Self::Mounted { identity, .. } => identity,
        }
    }

    pub fn identity_mut(&mut self) -> &mut Identity {
        match self {
            Self::Empty { identity, .. }
            | Self::HostBound { identity, .. }
            | Self::Mounted { identity, .. } => identity,
        }
    }

    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Empty { .. } => None,
            Self::HostBound { host, .. } | Self::Mounted { host, .. } => Some(host),
        }
    }

    /// The cancellation cell every RPC channel this session opens is given
    /// a clone of. The REPL rearms it before each command so a SIGINT only
    /// ever aborts the call currently in flight.
    pub fn cancel_cell(&self) -> CancelCell {
        match self {
            Self::Empty { cancel, .. }
            | Self::HostBound { cancel, .. }
            | Self::Mounted { cancel, .. } => cancel.clone(),
        }
    }

    /// Bind the session to a remote host name, dropping any existing mount.
    pub fn set_host(&mut self, host: String) {
        self.set_host_with_route(host, None);
    }

    /// Bind the session to a remote host name, additionally recording a
    /// source route to apply when the mount daemon connection is opened.
    pub fn set_host_with_route(
        &mut self,
        host: String,
        source_route: Option<(Option<String>, SourceRoute)>,
    ) {
        let identity = self.identity().clone();
        let cancel = self.cancel_cell();
        *self = Self::HostBound {
            host,
            identity,
            source_route,
            cancel,
        };
    }

    pub fn cwd_path(&self) -> &str {
        match self {
            Self::Mounted { cwd_path, .. } => cwd_path,
            _ => "/",
        }
    }

    pub fn cwd_handle(&self) -> Option<&Handle> {
        match self {
            Self::Mounted { cwd, .. } => Some(cwd),
            _ => None,
        }
    }

    pub fn set_cwd(&mut self, handle: Handle, path: String) {
        if let Self::Mounted { cwd, cwd_path, .. } = self {
            *cwd = handle;
            *cwd_path = path;
        }
    }

    pub fn nfs_mut(&mut self) -> Result<&mut Nfs3Client<NfsIo>, ShellError> {
        match self {
            Self::Mounted { nfs, .. } => Ok(nfs),
            _ => Err(ShellError::NotReady("not mounted")),
        }
    }

    pub fn root_handle(&self) -> Option<&Handle> {
        match self {
            Self::Mounted { root, .. } => Some(root),
            _ => None,
        }
    }

    /// Server-advertised transfer sizes once mounted; a conservative
    /// fallback otherwise (only reachable before a `nfs_mut` call would
    /// have already failed).
    pub fn rtmax(&self) -> u32 {
        match self {
            Self::Mounted { rtmax, .. } => *rtmax,
            _ => DEFAULT_CHUNK,
        }
    }

    pub fn wtmax(&self) -> u32 {
        match self {
            Self::Mounted { wtmax, .. } => *wtmax,
            _ => DEFAULT_CHUNK,
        }
    }

    /// Resolve `host`'s portmapper/mount ports, run MOUNT3's `MNT`, and open
    /// the NFS channel against the NFS server's own resolved address --
    /// never the mount daemon's, even if a server runs them on different
    /// ports.
    pub async fn mount(
        &mut self,
        export_path: &str,
        transport: Transport,
        options: MountOptions,
    ) -> Result<(), ShellError> {
        let host = self
            .host()
            .ok_or(ShellError::Usage("mount: no host specified".to_string()))?
            .to_string();
        let source_route = match self {
            Self::HostBound { source_route, .. } => source_route.clone(),
            _ => None,
        };
        let identity = self.identity().clone();
        let cancel = self.cancel_cell();
        let control = ChannelControl::new(cancel.clone());
        let export_path = export_path.to_string();

        let mounted = run_cancellable(&cancel, async move {
            resolve_host(&host)?;

            let connector = TokioConnector;

            let portmap_io = connector
                .connect(&host, nfs3_types::portmap::PMAP_PORT)
                .await?;
            let mut portmapper =
                nfs3_client::PortmapperClient::new_with_control(portmap_io, control.clone());
            let mount_port = portmapper
                .getport(nfs3_types::mount::PROGRAM, nfs3_types::mount::VERSION)
                .await?;
            let nfs_port = match options.nfs_port_override {
                Some(port) => port,
                None => {
                    portmapper
                        .getport(nfs3_types::nfs3::PROGRAM, nfs3_types::nfs3::VERSION)
                        .await?
                }
            };

            let mount_res: nfs3_types::mount::mountres3_ok<'static> = if options.thru_portmap {
                // No direct connection to the mount daemon at all: its MNT
                // call is relayed through the portmapper's PMAPPROC_CALLIT,
                // which speaks in raw argument/result bytes rather than a
                // typed RPC.
                let mnt_args = dirpath(Opaque::borrowed(export_path.as_bytes()));
                let mut buf = Vec::new();
                mnt_args
                    .pack(&mut buf)
                    .map_err(nfs3_client::error::Error::from)?;
                let (_port, res_bytes) = portmapper
                    .callit(
                        nfs3_types::mount::PROGRAM,
                        nfs3_types::mount::VERSION,
                        nfs3_types::mount::MOUNT_PROGRAM::MOUNTPROC3_MNT as u32,
                        &buf,
                    )
                    .await?;
                let mut cursor = std::io::Cursor::new(res_bytes);
                let (res, _): (nfs3_types::mount::mountres3<'static>, usize) =
                    Unpack::unpack(&mut cursor).map_err(nfs3_client::error::Error::from)?;
                match res {
                    nfs3_types::mount::mountres3::Ok(ok) => ok,
                    nfs3_types::mount::mountres3::Err(stat) => {
                        return Err(nfs3_client::error::Error::MountError(stat).into());
                    }
                }
            } else {
                let mount_io = match &source_route {
                    Some(route) => connect_with_source_route(route, mount_port).await?,
                    None => connect_preferring_reserved(&connector, &host, mount_port).await?,
                };
                let mut mount_client = MountClient::new_with_control(
                    mount_io,
                    identity.credential().to_opaque_auth(),
                    Default::default(),
                    control.clone(),
                );
                let path_opaque = Opaque::borrowed(export_path.as_bytes());
                let res = mount_client.mnt(dirpath(path_opaque)).await?;

                if options.unmount_after {
                    // Drop the mount daemon's bookkeeping entry right away;
                    // the file handle we already hold keeps working since
                    // NFS is stateless.
                    let _ = mount_client
                        .umnt(dirpath(Opaque::borrowed(export_path.as_bytes())))
                        .await;
                }
                res
            };

            // Always target the NFS server's own resolved address, not the
            // mount daemon's -- the bug this structure makes impossible.
            let mut nfs: Nfs3Client<NfsIo> = match transport {
                Transport::Tcp => {
                    connect_nfs_tcp(&connector, &host, nfs_port, &identity, control.clone()).await?
                }
                Transport::Udp => connect_nfs_udp(&host, nfs_port, &identity, control).await?,
                Transport::Auto => {
                    match connect_nfs_tcp(&connector, &host, nfs_port, &identity, control.clone())
                        .await
                    {
                        Ok(nfs) => nfs,
                        Err(_) => connect_nfs_udp(&host, nfs_port, &identity, control).await?,
                    }
                }
            };

            let root = Handle(mount_res.fhandle.0.to_vec());
            let (rtmax, wtmax) = fetch_transfer_sizes(&mut nfs, &root).await;

            Ok(MountedState {
                host,
                identity,
                nfs,
                root,
                rtmax,
                wtmax,
            })
        })
        .await?;

        let cancel = self.cancel_cell();
        *self = Self::Mounted {
            host: mounted.host,
            identity: mounted.identity,
            nfs: mounted.nfs,
            root: mounted.root.clone(),
            cwd: mounted.root,
            cwd_path: "/".to_string(),
            rtmax: mounted.rtmax,
            wtmax: mounted.wtmax,
            cancel,
        };

        Ok(())
    }

    /// `HostBound` x `handle H`: open the NFS channel directly, without ever
    /// calling MOUNT3, and install the caller-supplied bytes as both the
    /// mount root and the current directory. Mirrors `mount`'s transport
    /// and port handling, minus the mount-daemon round trip.
    pub async fn use_handle(
        &mut self,
        handle_bytes: Vec<u8>,
        transport: Transport,
        options: MountOptions,
    ) -> Result<(), ShellError> {
        let host = self
            .host()
            .ok_or(ShellError::Usage("handle: no host specified".to_string()))?
            .to_string();
        let identity = self.identity().clone();
        let cancel = self.cancel_cell();
        let control = ChannelControl::new(cancel.clone());

        let mounted = run_cancellable(&cancel, async move {
            resolve_host(&host)?;

            let connector = TokioConnector;

            let nfs_port = match options.nfs_port_override {
                Some(port) => port,
                None => {
                    let portmap_io = connector
                        .connect(&host, nfs3_types::portmap::PMAP_PORT)
                        .await?;
                    let mut portmapper = nfs3_client::PortmapperClient::new_with_control(
                        portmap_io,
                        control.clone(),
                    );
                    portmapper
                        .getport(nfs3_types::nfs3::PROGRAM, nfs3_types::nfs3::VERSION)
                        .await?
                }
            };

            let mut nfs: Nfs3Client<NfsIo> = match transport {
                Transport::Tcp => {
                    connect_nfs_tcp(&connector, &host, nfs_port, &identity, control.clone()).await?
                }
                Transport::Udp => connect_nfs_udp(&host, nfs_port, &identity, control).await?,
                Transport::Auto => {
                    match connect_nfs_tcp(&connector, &host, nfs_port, &identity, control.clone())
                        .await
                    {
                        Ok(nfs) => nfs,
                        Err(_) => connect_nfs_udp(&host, nfs_port, &identity, control).await?,
                    }
                }
            };

            let root = Handle(handle_bytes);
            let (rtmax, wtmax) = fetch_transfer_sizes(&mut nfs, &root).await;

            Ok(MountedState {
                host,
                identity,
                nfs,
                root,
                rtmax,
                wtmax,
            })
        })
        .await?;

        let cancel = self.cancel_cell();
        *self = Self::Mounted {
            host: mounted.host,
            identity: mounted.identity,
            nfs: mounted.nfs,
            root: mounted.root.clone(),
            cwd: mounted.root,
            cwd_path: "<handle>".to_string(),
            rtmax: mounted.rtmax,
            wtmax: mounted.wtmax,
            cancel,
        };

        Ok(())
    }

    /// Drop back to `HostBound`, keeping the host name so `mount` can be
    /// retried without re-entering `host`.
    pub fn unmount(&mut self) {
        if let Self::Mounted {
            host,
            identity,
            cancel,
            ..
        } = self
        {
            let host = std::mem::take(host);
            let identity = identity.clone();
            let cancel = cancel.clone();
            *self = Self::HostBound {
                host,
                identity,
                source_route: None,
                cancel,
            };
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields needed to build a `Session::Mounted`, assembled off to the side so
/// the connect/mount sequence above can run inside a cancellable,
/// timeout-bounded block without holding `&mut Session` across its awaits.
struct MountedState {
    host: String,
    identity: Identity,
    nfs: Nfs3Client<NfsIo>,
    root: Handle,
    rtmax: u32,
    wtmax: u32,
}

/// Race `fut` against the session's cancellation cell and an overall
/// per-command deadline, the way every NFS/MOUNT call already does
/// individually -- `mount`/`handle` additionally cover the raw TCP
/// connect steps that happen before any `RpcClient` exists to do that
/// itself.
async fn run_cancellable<T, F>(cancel: &CancelCell, fut: F) -> Result<T, ShellError>
where
    F: std::future::Future<Output = Result<T, ShellError>>,
{
    let token = cancel.token();
    tokio::select! {
        res = tokio::time::timeout(DEFAULT_TIMEOUT, fut) => {
            match res {
                Ok(inner) => inner,
                Err(_elapsed) => Err(nfs3_client::error::Error::Timeout.into()),
            }
        }
        () = token.cancelled() => Err(nfs3_client::error::Error::Cancelled.into()),
    }
}

/// Call FSINFO for the transfer sizes the rest of the session uses for
/// READ/WRITE chunking. A server that rejects or can't be asked falls back
/// to a conservative default rather than failing the whole mount over a
/// single optional-in-practice call.
async fn fetch_transfer_sizes(nfs: &mut Nfs3Client<NfsIo>, root: &Handle) -> (u32, u32) {
    let res = nfs
        .fsinfo(FSINFO3args {
            fsroot: root.to_nfs_fh3(),
        })
        .await;
    match res {
        Ok(Nfs3Result::Ok(ok)) => (ok.rtmax, ok.wtmax),
        _ => (DEFAULT_CHUNK, DEFAULT_CHUNK),
    }
}

/// Connect from a reserved (<1024) local port when one is available, the way
/// a traditional NFS client does to satisfy servers that only trust
/// AUTH_UNIX from privileged sources; fall back to an ephemeral port rather
/// than failing the mount outright when none can be bound (e.g. non-root).
async fn connect_preferring_reserved(
    connector: &TokioConnector,
    host: &str,
    port: u16,
) -> Result<NfsIo, ShellError> {
    match nfs3_client::privileged_port::acquire_reserved_tcp_port() {
        Ok(local_port) => match connector.connect_with_port(host, port, local_port).await {
            Ok(io) => Ok(io),
            Err(_) => Ok(connector.connect(host, port).await?),
        },
        Err(_) => Ok(connector.connect(host, port).await?),
    }
}

async fn connect_nfs_tcp(
    connector: &TokioConnector,
    host: &str,
    port: u16,
    identity: &Identity,
    control: ChannelControl,
) -> Result<Nfs3Client<NfsIo>, ShellError> {
    let nfs_io = connect_preferring_reserved(connector, host, port).await?;
    let rpc = nfs3_client::rpc::RpcClient::new_with_control(
        nfs_io,
        identity.credential().to_opaque_auth(),
        Default::default(),
        control,
    );
    Ok(Nfs3Client::new(rpc))
}

async fn connect_nfs_udp(
    host: &str,
    port: u16,
    identity: &Identity,
    control: ChannelControl,
) -> Result<Nfs3Client<NfsIo>, ShellError> {
    let socket = match nfs3_client::privileged_port::acquire_reserved_udp_socket() {
        Ok(reserved) => {
            reserved.set_nonblocking(true)?;
            tokio::net::UdpSocket::from_std(reserved.into())?
        }
        Err(_) => tokio::net::UdpSocket::bind("0.0.0.0:0").await?,
    };
    socket.connect((host, port)).await?;
    let rpc = nfs3_client::udp::UdpRpcClient::new_with_control(
        socket,
        identity.credential().to_opaque_auth(),
        Default::default(),
        control,
    );
    Ok(Nfs3Client::new_udp(rpc))
}

/// Connect to the mount daemon through a loose source route: bind the local
/// end (to the given address if one was given, a reserved port if not), set
/// `IP_OPTIONS`, then connect on to the route's destination.
async fn connect_with_source_route(
    route: &(Option<String>, SourceRoute),
    port: u16,
) -> Result<NfsIo, ShellError> {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    let (local_addr, source_route) = route;
    let socket = tokio::net::TcpSocket::new_v4()?;

    let local_ip = match local_addr {
        Some(addr) => addr
            .parse::<Ipv4Addr>()
            .map_err(|_| ShellError::Usage(format!("host: invalid source address '{addr}'")))?,
        None => Ipv4Addr::UNSPECIFIED,
    };
    let reserved_port = nfs3_client::privileged_port::acquire_reserved_tcp_port().unwrap_or(0);
    if socket
        .bind(SocketAddr::new(IpAddr::V4(local_ip), reserved_port))
        .is_err()
    {
        socket.bind(SocketAddr::new(IpAddr::V4(local_ip), 0))?;
    }

    source_route.apply(&socket)?;

    let dest = SocketAddr::new(IpAddr::V4(source_route.destination()), port);
    let stream = socket.connect(dest).await?;
    Ok(NfsIo::new(stream))
}

fn resolve_host(host: &str) -> Result<(), ShellError> {
    (host, 0u16)
        .to_socket_addrs()
        .map_err(|e| ShellError::Usage(format!("mount: cannot resolve host '{host}': {e}")))?
        .next()
        .ok_or_else(|| ShellError::Usage(format!("mount: cannot resolve host '{host}'")))?;
    Ok(())
}
