//! Request dispatch for one downstream connection.

use std::net::SocketAddr;

use crate::error::{ProxyError, Result};
use crate::protocol::{Range, RtspRequest, RtspResponse, TransportHeader};
use crate::proxy::session::ProxySession;
use crate::registry::{StreamRegistry, extract_path};
use crate::stream::DownstreamLink;

/// Maps RTSP requests from one player onto its proxy session.
///
/// Owned by the connection thread. [`handle`](Self::handle) returns a
/// response for every request except those whose path resolves to no
/// configured stream or whose origin cannot be reached, which it reports
/// as errors so the connection closes without answering.
pub struct ProxyHandler {
    registry: StreamRegistry,
    downstream: DownstreamLink,
    session: Option<ProxySession>,
    peer_addr: SocketAddr,
}

impl ProxyHandler {
    pub fn new(
        registry: StreamRegistry,
        downstream: DownstreamLink,
        peer_addr: SocketAddr,
    ) -> Self {
        ProxyHandler {
            registry,
            downstream,
            session: None,
            peer_addr,
        }
    }

    /// Answer one request.
    ///
    /// `Err` means the connection must close unanswered: the request named
    /// an unconfigured path, or the origin connection could not be opened.
    pub fn handle(&mut self, request: &RtspRequest) -> Result<RtspResponse> {
        self.ensure_session(request)?;

        let result = match request.method.as_str() {
            "OPTIONS" => Ok(self.options()),
            "DESCRIBE" => self.describe(request),
            "SETUP" => self.setup(request),
            "PLAY" => self.play(request),
            "PAUSE" => self.forward_simple("PAUSE"),
            "RECORD" => self.forward_simple("RECORD"),
            "ANNOUNCE" => self.announce(),
            "TEARDOWN" => Ok(self.teardown_response(request)),
            "GET_PARAMETER" | "SET_PARAMETER" => {
                tracing::debug!(peer = %self.peer_addr, method = %request.method, "not implemented");
                Ok(RtspResponse::not_implemented())
            }
            other => {
                tracing::warn!(peer = %self.peer_addr, method = other, "unsupported method");
                Ok(RtspResponse::not_implemented())
            }
        };

        let mut response = match result {
            Ok(response) => response,
            Err(e) => self.response_for(&e),
        };
        if let Some(cseq) = request.cseq() {
            response = response.add_header("CSeq", cseq);
        }
        Ok(response)
    }

    /// Close the session when the connection ends outside TEARDOWN.
    pub fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            tracing::debug!(peer = %self.peer_addr, stream = %session.name(), "closing session");
            session.close();
        }
    }

    /// Open the session on the first request, whatever its method.
    fn ensure_session(&mut self, request: &RtspRequest) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let path = extract_path(&request.uri);
        let session = ProxySession::open(&self.registry, path, self.downstream.clone())?;
        self.session = Some(session);
        Ok(())
    }

    fn options(&self) -> RtspResponse {
        RtspResponse::ok().add_header(
            "Public",
            "OPTIONS, DESCRIBE, ANNOUNCE, SETUP, PLAY, PAUSE, RECORD, TEARDOWN",
        )
    }

    /// Pass the origin's session description through, rebasing control
    /// URL resolution onto the proxy's own address.
    fn describe(&mut self, request: &RtspRequest) -> Result<RtspResponse> {
        let session = self.session_mut()?;
        let (_, upstream) = session.describe()?;

        let content_type = upstream.header("Content-Type").unwrap_or("application/sdp");
        Ok(RtspResponse::new(upstream.status_code, &upstream.status_text)
            .add_header("Content-Base", &request.uri)
            .add_header("Content-Type", content_type)
            .with_body(upstream.body.clone()))
    }

    fn setup(&mut self, request: &RtspRequest) -> Result<RtspResponse> {
        let session = self.session_ref()?;
        let stream = session.stream_or_sequence("SETUP")?;
        let track = parse_track_id(&request.uri)?;

        let Some(value) = request.header("Transport") else {
            tracing::warn!(peer = %self.peer_addr, "SETUP without Transport header");
            return Ok(unsupported_transport("Transport header missing"));
        };
        let Some(requested) = TransportHeader::parse(value) else {
            tracing::warn!(peer = %self.peer_addr, transport = value, "unsupported transport");
            return Ok(unsupported_transport(&format!("unsupported transport {value:?}")));
        };

        let _ = session.setup_upstream(track)?;
        let reply = stream.set_track_transport(track, &requested)?;

        Ok(RtspResponse::ok()
            .add_header("Transport", &reply)
            .add_header("Session", &stream.session_header_value()))
    }

    fn play(&mut self, request: &RtspRequest) -> Result<RtspResponse> {
        let session = self.session_ref()?;
        let stream = session.stream_or_sequence("PLAY")?;

        // Arm before validating the range: a malformed PLAY retried with a
        // good range must find the relay already in place.
        session.arm_relay()?;

        let value = request
            .header("Range")
            .ok_or_else(|| ProxyError::MalformedRequest("Range header missing".into()))?;
        let range =
            Range::parse(value).map_err(|e| ProxyError::MalformedRequest(e.to_string()))?;

        let upstream = session.play(&range)?;
        tracing::info!(peer = %self.peer_addr, stream = %session.name(), range = %range.header_value(), "playing");

        let mut response =
            RtspResponse::ok().add_header("Session", &stream.session_header_value());
        if let Some(range) = upstream.header("Range") {
            response = response.add_header("Range", range);
        }
        if let Some(info) = upstream.header("RTP-Info") {
            response = response.add_header("RTP-Info", info);
        }
        Ok(response)
    }

    /// PAUSE and RECORD: forwarded as-is, with no ordering requirement of
    /// their own. The origin is the judge of whether they make sense yet.
    fn forward_simple(&mut self, method: &'static str) -> Result<RtspResponse> {
        let session = self.session_ref()?;

        let _ = match method {
            "PAUSE" => session.pause()?,
            _ => session.record()?,
        };
        tracing::debug!(peer = %self.peer_addr, stream = %session.name(), method, "forwarded");

        let mut response = RtspResponse::ok();
        if let Some(stream) = session.stream() {
            response = response.add_header("Session", &stream.session_header_value());
        }
        Ok(response)
    }

    fn announce(&mut self) -> Result<RtspResponse> {
        let session = self.session_ref()?;
        let _ = session.announce()?;
        Ok(RtspResponse::ok())
    }

    /// TEARDOWN is answered locally; the upstream side is closed as part
    /// of session teardown rather than by forwarding the player's request.
    ///
    /// A `Session` header naming anything other than the established
    /// session is refused with 454 and closes nothing.
    fn teardown_response(&mut self, request: &RtspRequest) -> RtspResponse {
        if let Some(session) = &self.session {
            if let (Some(stream), Some(requested)) = (session.stream(), request.header("Session"))
            {
                let id = requested.split(';').next().unwrap_or(requested).trim();
                if id != stream.session_id() {
                    tracing::warn!(peer = %self.peer_addr, session = id, "TEARDOWN for unknown session");
                    return RtspResponse::new(454, "Session Not Found");
                }
            }
        }
        if let Some(mut session) = self.session.take() {
            tracing::info!(peer = %self.peer_addr, stream = %session.name(), "session torn down");
            session.close();
        }
        RtspResponse::ok()
    }

    fn response_for(&self, error: &ProxyError) -> RtspResponse {
        match error {
            ProxyError::Sequence { .. } | ProxyError::MalformedRequest(_) => {
                tracing::warn!(peer = %self.peer_addr, %error, "rejecting request");
                RtspResponse::bad_request().with_body(error.to_string())
            }
            ProxyError::Upstream(_) | ProxyError::UpstreamStatus { .. } => {
                tracing::error!(peer = %self.peer_addr, %error, "upstream exchange failed");
                RtspResponse::gateway_error().with_body(error.to_string())
            }
            error => {
                tracing::error!(peer = %self.peer_addr, %error, "request failed");
                RtspResponse::internal_error().with_body(error.to_string())
            }
        }
    }

    fn session_ref(&self) -> Result<&ProxySession> {
        self.session
            .as_ref()
            .ok_or_else(|| ProxyError::Internal("no active session".into()))
    }

    fn session_mut(&mut self) -> Result<&mut ProxySession> {
        self.session
            .as_mut()
            .ok_or_else(|| ProxyError::Internal("no active session".into()))
    }
}

fn unsupported_transport(detail: &str) -> RtspResponse {
    RtspResponse::new(461, "Unsupported Transport").with_body(detail)
}

/// Track index from a SETUP URI.
///
/// Accepts the conventional `/trackID=N` suffix as well as a bare numeric
/// last path segment, which some encoders emit.
fn parse_track_id(uri: &str) -> Result<usize> {
    let raw = match uri.rfind("/trackID=") {
        Some(pos) => &uri[pos + "/trackID=".len()..],
        None => uri.rsplit('/').next().unwrap_or(uri),
    };
    raw.parse()
        .map_err(|_| ProxyError::MalformedRequest(format!("invalid track ID: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_from_suffix() {
        assert_eq!(parse_track_id("rtsp://host:8554/cam/trackID=0").unwrap(), 0);
        assert_eq!(parse_track_id("rtsp://host:8554/cam/trackID=12").unwrap(), 12);
    }

    #[test]
    fn track_id_from_bare_segment() {
        assert_eq!(parse_track_id("rtsp://host:8554/cam/1").unwrap(), 1);
    }

    #[test]
    fn track_id_rejects_garbage() {
        let err = parse_track_id("rtsp://host:8554/cam/trackID=abc").unwrap_err();
        assert_eq!(err.to_string(), "invalid track ID: abc");

        let err = parse_track_id("rtsp://host:8554/cam").unwrap_err();
        assert_eq!(err.to_string(), "invalid track ID: cam");
    }
}
