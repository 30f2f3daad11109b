//! Per-connection proxying: request dispatch, session lifecycle, and the
//! packet relay.
//!
//! Each downstream connection owns one [`ProxyHandler`]. The handler binds
//! a [`session::ProxySession`] to the stream named by the first request's
//! path and routes every subsequent request through it. PLAY installs a
//! [`relay::PacketRelay`] so packets arriving on the upstream leg are
//! written straight to the player.

pub mod handler;
pub mod relay;
pub mod session;

pub use handler::ProxyHandler;
pub use session::ProxySession;
