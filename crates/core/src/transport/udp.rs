use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

const SERVER_PORT_MIN: u64 = 5000;
const SERVER_PORT_MAX: u64 = 65534;

static NEXT_SERVER_PORT: AtomicU64 = AtomicU64::new(SERVER_PORT_MIN);

/// UDP transport for outbound packet delivery.
///
/// Binds a single ephemeral socket (`0.0.0.0:0`) shared by every proxied
/// stream whose downstream player negotiated `client_port` delivery.
///
/// This layer is deliberately address-only — it knows nothing about
/// sessions or tracks. The proxied stream resolves its per-track transport
/// to a socket address before calling [`send_to`](Self::send_to).
pub struct UdpSender {
    socket: Arc<UdpSocket>,
}

impl UdpSender {
    /// Bind an ephemeral UDP socket for outbound delivery.
    pub fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    /// Send raw bytes to a specific socket address.
    pub fn send_to(&self, payload: &[u8], addr: SocketAddr) -> Result<usize> {
        Ok(self.socket.send_to(payload, addr)?)
    }
}

/// Allocate a pair of (RTP, RTCP) ports to advertise as `server_port`.
///
/// Ports come from a monotonic counter starting at 5000; the range wraps
/// back to 5000 past 65534. Per RFC 3550 §11, RTP ports are even and
/// RTCP = RTP + 1. The ports are advertised only, never bound — all
/// outbound delivery leaves through the shared [`UdpSender`] socket.
pub fn allocate_server_ports() -> (u16, u16) {
    let rtp = NEXT_SERVER_PORT.fetch_add(2, Ordering::SeqCst);

    if rtp > SERVER_PORT_MAX {
        tracing::warn!(rtp, "port range exhausted, wrapping to {SERVER_PORT_MIN}");
        NEXT_SERVER_PORT.store(SERVER_PORT_MIN, Ordering::SeqCst);
        let rtp = NEXT_SERVER_PORT.fetch_add(2, Ordering::SeqCst);
        return (rtp as u16, rtp as u16 + 1);
    }

    tracing::trace!(rtp_port = rtp, rtcp_port = rtp + 1, "allocated server ports");
    (rtp as u16, rtp as u16 + 1)
}
