//! Per-channel call timeout and cancellation.
//!
//! A fresh [`ChannelControl`] gets baked into an `RpcClient`/`UdpRpcClient`
//! at construction time and stays there for the connection's lifetime, but
//! the [`CancellationToken`] it carries is reached through a shared cell so
//! a caller (the REPL's SIGINT handler) can swap in a freshly-armed token
//! before each command without reconnecting.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Channel default from the original client's read/write timeout handling.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared cell holding whichever token currently represents "the command in
/// flight". Triggering it aborts whatever call is reading it right now;
/// replacing its contents arms a fresh one for the next call without
/// disturbing the connection.
#[derive(Clone)]
pub struct CancelCell(Arc<Mutex<CancellationToken>>);

impl CancelCell {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(CancellationToken::new())))
    }

    /// Arm a fresh, uncancelled token for the next call, returning the old
    /// one (which remains valid for anything already racing against it).
    pub fn rearm(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        let mut guard = self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::replace(&mut *guard, fresh)
    }

    /// Cancel whatever token is current right now.
    pub fn cancel(&self) {
        let guard = self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.cancel();
    }

    /// The token currently in force. Race a call (or a whole connection
    /// sequence) against `.cancelled()` on this to let an outside cancel
    /// abort it.
    pub fn token(&self) -> CancellationToken {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Default for CancelCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Knobs threaded into every `RpcClient`/`UdpRpcClient` call: how long to
/// wait for a reply, and where to look for a cancellation request.
#[derive(Clone)]
pub struct ChannelControl {
    pub timeout: Duration,
    pub cancel: CancelCell,
}

impl ChannelControl {
    pub fn new(cancel: CancelCell) -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            cancel,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.token()
    }
}

impl Default for ChannelControl {
    fn default() -> Self {
        Self::new(CancelCell::new())
    }
}
