//! One player's session with one proxied stream.

use std::sync::Arc;

use crate::client::UpstreamClient;
use crate::config::{StreamConfig, redacted_url};
use crate::error::{ProxyError, Result};
use crate::protocol::{Range, RtspResponse};
use crate::proxy::relay::PacketRelay;
use crate::registry::StreamRegistry;
use crate::stream::{DownstreamLink, ProxiedStream};

/// Binds a downstream connection to its upstream client and proxied
/// stream.
///
/// Created on the connection's first request, whatever its method: the
/// upstream connection is established eagerly so even an OPTIONS probe
/// fails fast when the origin is unreachable. The stream itself only
/// exists after DESCRIBE; operations that need it before then fail with
/// [`ProxyError::Sequence`].
pub struct ProxySession {
    config: Arc<StreamConfig>,
    downstream: DownstreamLink,
    upstream: Option<UpstreamClient>,
    stream: Option<Arc<ProxiedStream>>,
}

impl ProxySession {
    /// Resolve `path` against the registry and connect to the origin.
    pub fn open(
        registry: &StreamRegistry,
        path: &str,
        downstream: DownstreamLink,
    ) -> Result<Self> {
        let config = registry
            .resolve(path)
            .ok_or_else(|| ProxyError::PathNotFound(path.to_string()))?;

        let upstream = UpstreamClient::connect(&config)?;
        tracing::info!(
            stream = %config.name,
            peer = %downstream.peer_ip,
            url = %redacted_url(&config.url),
            "session opened"
        );

        Ok(ProxySession {
            config,
            downstream,
            upstream: Some(upstream),
            stream: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Forward DESCRIBE and return the stream together with the origin's
    /// response.
    ///
    /// The stream is created on the first call and kept across repeats, so
    /// a player re-describing mid-session does not lose its negotiated
    /// transports. The response body is always the origin's current one.
    pub fn describe(&mut self) -> Result<(Arc<ProxiedStream>, RtspResponse)> {
        let (description, response) = self.upstream()?.describe()?;

        let stream = match &self.stream {
            Some(stream) => stream.clone(),
            None => {
                let stream = Arc::new(ProxiedStream::new(description, self.downstream.clone()));
                self.stream = Some(stream.clone());
                stream
            }
        };
        Ok((stream, response))
    }

    /// The proxied stream, or the sequence error for `method` when
    /// DESCRIBE has not happened yet.
    pub fn stream_or_sequence(&self, method: &'static str) -> Result<Arc<ProxiedStream>> {
        self.stream.clone().ok_or(ProxyError::Sequence { method })
    }

    pub fn stream(&self) -> Option<Arc<ProxiedStream>> {
        self.stream.clone()
    }

    /// Forward SETUP for `track`, resolving its control URL from the
    /// session description.
    ///
    /// The downstream transport is bound separately via
    /// [`ProxiedStream::set_track_transport`], after this succeeds.
    pub fn setup_upstream(&self, track: usize) -> Result<RtspResponse> {
        let stream = self.stream_or_sequence("SETUP")?;
        let control = stream
            .description()
            .media
            .get(track)
            .ok_or_else(|| ProxyError::MalformedRequest(format!("track ID out of range: {track}")))?
            .control
            .clone();

        self.upstream()?.setup(track, control.as_deref())
    }

    /// Point upstream packet delivery at the proxied stream.
    ///
    /// Called on every PLAY; re-arming replaces the previous relay with an
    /// equivalent one.
    pub fn arm_relay(&self) -> Result<()> {
        let stream = self.stream_or_sequence("PLAY")?;
        self.upstream()?.subscribe(Arc::new(PacketRelay::new(stream)));
        Ok(())
    }

    pub fn play(&self, range: &Range) -> Result<RtspResponse> {
        self.upstream()?.play(range)
    }

    pub fn pause(&self) -> Result<RtspResponse> {
        self.upstream()?.pause()
    }

    pub fn record(&self) -> Result<RtspResponse> {
        self.upstream()?.record()
    }

    /// Forward ANNOUNCE carrying the stream's session description.
    pub fn announce(&self) -> Result<RtspResponse> {
        let stream = self.stream_or_sequence("ANNOUNCE")?;
        self.upstream()?.announce(stream.description().raw())
    }

    /// Tear the session down: the stream closes first so relay writes stop
    /// cleanly, then the upstream client disconnects. Idempotent.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.close();
        }
        if let Some(upstream) = self.upstream.take() {
            upstream.close();
        }
    }

    fn upstream(&self) -> Result<&UpstreamClient> {
        self.upstream
            .as_ref()
            .ok_or_else(|| ProxyError::Internal("session is closed".into()))
    }
}

impl Drop for ProxySession {
    fn drop(&mut self) {
        self.close();
    }
}
