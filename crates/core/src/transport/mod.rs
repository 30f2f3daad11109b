//! Network transport layer for RTSP signaling and relayed media delivery.
//!
//! The downstream side of the proxy uses a split transport model:
//!
//! - **TCP** ([`tcp`]): carries RTSP request/response signaling. One TCP
//!   connection per player, with a thread per connection. When a player
//!   negotiates interleaved delivery, relayed packets share this
//!   connection as `$`-framed binary ([`interleaved`], RFC 2326 §10.12).
//!
//! - **UDP** ([`udp`]): carries relayed packets for players that negotiate
//!   `client_port` delivery. A single ephemeral socket is shared for all
//!   outbound sends.
//!
//! The upstream leg always runs TCP-interleaved; see [`crate::client`].

pub mod interleaved;
pub mod tcp;
pub mod udp;

pub use udp::UdpSender;
