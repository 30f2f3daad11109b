//! Transport-header repair for buggy origins.
//!
//! Some origins negotiate TCP interleaving but still answer SETUP with
//! `Transport: RTP/AVP;...` — the lower-transport qualifier is missing, so
//! standard clients read the session as UDP and playback never starts.
//! Streams configured with `fix_force_tcp_in_transport` get such response
//! headers rewritten to `RTP/AVP/TCP;...` before any further processing.

use crate::protocol::RtspResponse;

/// Restore the missing TCP qualifier in a response's `Transport` header.
///
/// The rewrite applies only when the response carries exactly one
/// `Transport` value and that value starts with the literal `RTP/AVP;`.
/// Responses with no `Transport`, several of them, or any other prefix
/// (including an already-correct `RTP/AVP/TCP;`) pass through untouched.
/// Returns whether a rewrite happened.
pub fn fix_force_tcp(response: &mut RtspResponse) -> bool {
    let mut transports = response
        .headers
        .iter_mut()
        .filter(|(name, _)| name.eq_ignore_ascii_case("Transport"));

    let Some((_, value)) = transports.next() else {
        return false;
    };
    if transports.next().is_some() {
        return false;
    }

    if let Some(rest) = value.strip_prefix("RTP/AVP;") {
        *value = format!("RTP/AVP/TCP;{rest}");
        return true;
    }
    false
}
