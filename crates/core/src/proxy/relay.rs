//! Upstream-to-downstream packet relay.

use std::sync::Arc;

use crate::client::PacketEvents;
use crate::error::ProxyError;
use crate::stream::ProxiedStream;

/// Writes every upstream packet into the proxied stream.
///
/// Installed as the upstream client's [`PacketEvents`] sink when PLAY is
/// handled. Runs on the upstream reader thread; delivery failures are
/// logged and swallowed so one bad write never stops the reader.
pub struct PacketRelay {
    stream: Arc<ProxiedStream>,
}

impl PacketRelay {
    pub fn new(stream: Arc<ProxiedStream>) -> Self {
        PacketRelay { stream }
    }

    fn report(&self, kind: &str, track: usize, error: ProxyError) {
        match error {
            // Expected during teardown while upstream packets are still in
            // flight.
            ProxyError::StreamClosed => {
                tracing::debug!(kind, track, "dropping packet for closed stream");
            }
            error => {
                tracing::warn!(kind, track, %error, "packet relay failed");
            }
        }
    }
}

impl PacketEvents for PacketRelay {
    fn on_rtp(&self, track: usize, packet: &[u8]) {
        if let Err(e) = self.stream.write_rtp(track, packet) {
            self.report("RTP", track, e);
        }
    }

    fn on_rtcp(&self, track: usize, packet: &[u8]) {
        if let Err(e) = self.stream.write_rtcp(track, packet) {
            self.report("RTCP", track, e);
        }
    }
}
