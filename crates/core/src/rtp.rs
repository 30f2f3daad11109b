//! RTP packet header inspection (RFC 3550 §5.1).
//!
//! The proxy relays packets byte-for-byte and never rewrites them. This
//! view exists for observability: sequence-gap detection on the upstream
//! leg and debug logging.

/// Length of the RTP fixed header.
pub const RTP_HEADER_LEN: usize = 12;

/// Decoded RTP fixed header fields (RFC 3550 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             SSRC                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpView {
    /// Protocol version; 2 for every packet the proxy should ever see.
    pub version: u8,
    /// Marker bit (RFC 3550 §5.1), last packet of a frame for video.
    pub marker: bool,
    /// RTP payload type (7-bit, RFC 3551).
    pub payload_type: u8,
    /// 16-bit wrapping sequence number.
    pub sequence: u16,
    /// Media timestamp in the codec's clock rate.
    pub timestamp: u32,
    /// Synchronization source identifier (RFC 3550 §8.1).
    pub ssrc: u32,
}

impl RtpView {
    /// Decode the fixed header. Returns `None` when the packet is shorter
    /// than [`RTP_HEADER_LEN`].
    pub fn parse(packet: &[u8]) -> Option<Self> {
        if packet.len() < RTP_HEADER_LEN {
            return None;
        }
        Some(RtpView {
            version: packet[0] >> 6,
            marker: packet[1] & 0x80 != 0,
            payload_type: packet[1] & 0x7f,
            sequence: u16::from_be_bytes([packet[2], packet[3]]),
            timestamp: u32::from_be_bytes([packet[4], packet[5], packet[6], packet[7]]),
            ssrc: u32::from_be_bytes([packet[8], packet[9], packet[10], packet[11]]),
        })
    }
}

/// Packets missing between `last` and `current` sequence numbers.
///
/// 0 means `current` directly follows `last`. Values at or above
/// [`SEQUENCE_REORDER_GUARD`] indicate reordering or duplication rather
/// than loss and should be ignored by callers.
pub fn sequence_gap(last: u16, current: u16) -> u16 {
    current.wrapping_sub(last.wrapping_add(1))
}

/// Gap threshold separating plausible loss from reordered or duplicated
/// packets (half the sequence space).
pub const SEQUENCE_REORDER_GUARD: u16 = 0x8000;
