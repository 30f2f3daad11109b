//! Downstream-facing proxied stream.
//!
//! A [`ProxiedStream`] is created by the first successful DESCRIBE on a
//! connection and owns everything needed to deliver relayed packets back
//! to that player: the parsed session description, the proxy-assigned
//! session ID, and one delivery transport per set-up track.

use std::net::{IpAddr, SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use rand::RngExt;

use crate::error::{ProxyError, Result};
use crate::protocol::TransportHeader;
use crate::protocol::sdp::SessionDescription;
use crate::transport::interleaved;
use crate::transport::udp::{self, UdpSender};

/// Session timeout advertised in the `Session` header (RFC 2326 §12.37).
pub const SESSION_TIMEOUT_SECS: u64 = 60;

/// Shared handles for delivering packets to one downstream connection.
///
/// Cloned from the connection into the proxied stream at DESCRIBE time.
/// The writer is the RTSP connection itself; interleaved delivery and
/// response writes serialize through its mutex.
#[derive(Clone)]
pub struct DownstreamLink {
    pub writer: Arc<Mutex<TcpStream>>,
    pub udp: Arc<UdpSender>,
    pub peer_ip: IpAddr,
}

/// Delivery transport negotiated for one track during SETUP.
#[derive(Debug, Clone, Copy)]
enum TrackTransport {
    Interleaved { rtp_channel: u8, rtcp_channel: u8 },
    Udp { rtp_addr: SocketAddr, rtcp_addr: SocketAddr },
}

enum Channel {
    Rtp,
    Rtcp,
}

/// One proxied stream: the downstream half of a proxy session.
///
/// Thread-safe; the relay writes packets from the upstream reader thread
/// while the connection thread handles requests and, eventually, teardown.
/// A write that races [`close`](Self::close) fails with
/// [`ProxyError::StreamClosed`], which callers treat as benign.
pub struct ProxiedStream {
    description: SessionDescription,
    session_id: String,
    downstream: DownstreamLink,
    tracks: RwLock<Vec<Option<TrackTransport>>>,
    closed: AtomicBool,
}

impl ProxiedStream {
    pub fn new(description: SessionDescription, downstream: DownstreamLink) -> Self {
        let session_id = new_session_id();
        let track_count = description.media_count();
        tracing::debug!(%session_id, tracks = track_count, "proxied stream created");
        ProxiedStream {
            description,
            session_id,
            downstream,
            tracks: RwLock::new(vec![None; track_count]),
            closed: AtomicBool::new(false),
        }
    }

    pub fn description(&self) -> &SessionDescription {
        &self.description
    }

    pub fn media_count(&self) -> usize {
        self.description.media_count()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Format the `Session` response header value per RFC 2326 §12.37.
    ///
    /// Example: `"A8F2C14490BB73DE;timeout=60"`
    pub fn session_header_value(&self) -> String {
        format!("{};timeout={}", self.session_id, SESSION_TIMEOUT_SECS)
    }

    /// Register downstream delivery for one track (SETUP) and return the
    /// `Transport` value to answer the player with.
    ///
    /// Track indices outside the described media set are rejected. A
    /// repeated SETUP for the same track replaces its transport.
    pub fn set_track_transport(
        &self,
        track: usize,
        requested: &TransportHeader,
    ) -> Result<String> {
        if track >= self.media_count() {
            return Err(ProxyError::MalformedRequest(format!(
                "track ID out of range: {track}"
            )));
        }

        let (transport, value) = match *requested {
            TransportHeader::Interleaved {
                rtp_channel,
                rtcp_channel,
            } => (
                TrackTransport::Interleaved {
                    rtp_channel,
                    rtcp_channel,
                },
                format!("RTP/AVP/TCP;unicast;interleaved={rtp_channel}-{rtcp_channel}"),
            ),
            TransportHeader::Udp {
                client_rtp_port,
                client_rtcp_port,
            } => {
                let (server_rtp, server_rtcp) = udp::allocate_server_ports();
                (
                    TrackTransport::Udp {
                        rtp_addr: SocketAddr::new(self.downstream.peer_ip, client_rtp_port),
                        rtcp_addr: SocketAddr::new(self.downstream.peer_ip, client_rtcp_port),
                    },
                    format!(
                        "RTP/AVP;unicast;client_port={client_rtp_port}-{client_rtcp_port};server_port={server_rtp}-{server_rtcp}"
                    ),
                )
            }
        };

        tracing::debug!(
            session_id = %self.session_id,
            track,
            transport = ?transport,
            "downstream transport configured"
        );
        self.tracks.write()[track] = Some(transport);
        Ok(value)
    }

    /// Deliver a relayed RTP packet for `track` to the player.
    pub fn write_rtp(&self, track: usize, packet: &[u8]) -> Result<()> {
        self.write_packet(track, packet, Channel::Rtp)
    }

    /// Deliver a relayed RTCP packet for `track` to the player.
    pub fn write_rtcp(&self, track: usize, packet: &[u8]) -> Result<()> {
        self.write_packet(track, packet, Channel::Rtcp)
    }

    fn write_packet(&self, track: usize, packet: &[u8], channel: Channel) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ProxyError::StreamClosed);
        }

        let transport = self
            .tracks
            .read()
            .get(track)
            .copied()
            .flatten()
            .ok_or_else(|| {
                ProxyError::RelayWrite(format!("no downstream transport for track {track}"))
            })?;

        match transport {
            TrackTransport::Interleaved {
                rtp_channel,
                rtcp_channel,
            } => {
                let frame_channel = match channel {
                    Channel::Rtp => rtp_channel,
                    Channel::Rtcp => rtcp_channel,
                };
                let mut writer = self.downstream.writer.lock();
                interleaved::write_frame(&mut *writer, frame_channel, packet)
                    .map_err(|e| ProxyError::RelayWrite(e.to_string()))
            }
            TrackTransport::Udp { rtp_addr, rtcp_addr } => {
                let addr = match channel {
                    Channel::Rtp => rtp_addr,
                    Channel::Rtcp => rtcp_addr,
                };
                self.downstream
                    .udp
                    .send_to(packet, addr)
                    .map(|_| ())
                    .map_err(|e| ProxyError::RelayWrite(e.to_string()))
            }
        }
    }

    /// Stop delivery. Idempotent; concurrent in-flight writes fail with
    /// [`ProxyError::StreamClosed`].
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(session_id = %self.session_id, "proxied stream closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Random session identifier, unguessable per RFC 2326 §12.37.
fn new_session_id() -> String {
    let id = rand::rng().random::<u64>();
    format!("{id:016X}")
}
