use crate::io::{AsyncRead, AsyncWrite};

/// Connects to a remote `(host, port)`, optionally from a chosen local port.
///
/// The `connect_with_port` variant exists for callers that already obtained a
/// bound-but-unconnected privileged socket (see
/// [`crate::privileged_port`]) and need the connector to finish the
/// three-way handshake from it rather than picking an ephemeral local port.
#[async_trait::async_trait(?Send)]
pub trait Connector {
    type Connection: AsyncRead + AsyncWrite;

    async fn connect(&self, host: &str, port: u16) -> std::io::Result<Self::Connection>;

    async fn connect_with_port(
        &self,
        host: &str,
        port: u16,
        local_port: u16,
    ) -> std::io::Result<Self::Connection>;
}
