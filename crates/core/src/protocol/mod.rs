//! RTSP protocol codec (RFC 2326).
//!
//! This module handles the text-based RTSP signaling protocol — parsing
//! requests and responses, building responses, and reading the headers the
//! proxy has to understand (`Transport`, `Range`) plus the SDP bodies it
//! relays.
//!
//! ## RTSP message format (RFC 2326 §4)
//!
//! RTSP messages follow HTTP/1.1 syntax with a different method set:
//!
//! ```text
//! DESCRIBE rtsp://server/cam1 RTSP/1.0\r\n
//! CSeq: 2\r\n
//! Accept: application/sdp\r\n
//! \r\n
//! ```
//!
//! Key differences from HTTP:
//! - Stateful: sessions persist across requests (RFC 2326 §3).
//! - Different methods: OPTIONS, DESCRIBE, SETUP, PLAY, PAUSE, TEARDOWN.
//! - Session header carries a server-assigned ID (RFC 2326 §12.37).
//!
//! ## Proxied methods
//!
//! | Method | RFC section | Handling |
//! |--------|-------------|----------|
//! | OPTIONS | §10.1 | Answered locally |
//! | DESCRIBE | §10.2 | Forwarded; SDP body relayed |
//! | SETUP | §10.4 | Forwarded per track; transport split per leg |
//! | PLAY | §10.5 | Forwarded; arms the packet relay |
//! | PAUSE | §10.6 | Forwarded |
//! | RECORD | §10.11 | Forwarded |
//! | ANNOUNCE | §10.3 | Forwarded with the stream's description |
//! | TEARDOWN | §10.7 | Answered locally; tears the session down |
//! | GET_PARAMETER | §10.8 | 501 (players fall back to OPTIONS keepalive) |

pub mod range;
pub mod request;
pub mod response;
pub mod sdp;
pub mod transport;

pub use range::Range;
pub use request::RtspRequest;
pub use response::RtspResponse;
pub use sdp::SessionDescription;
pub use transport::TransportHeader;
