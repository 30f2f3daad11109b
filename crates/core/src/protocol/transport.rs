/// Parsed downstream `Transport` header (RFC 2326 §12.39).
///
/// Players request either UDP delivery (`client_port=`) or TCP interleaving
/// (`interleaved=`); the proxy serves both on the downstream side. When a
/// header carries both parameters the interleaved pair wins, matching how
/// servers treat an explicit `RTP/AVP/TCP` profile.
///
/// ## Wire format examples
///
/// ```text
/// Transport: RTP/AVP;unicast;client_port=8000-8001
/// Transport: RTP/AVP/TCP;unicast;interleaved=0-1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportHeader {
    /// UDP delivery to the player's `client_port` pair.
    Udp {
        client_rtp_port: u16,
        client_rtcp_port: u16,
    },
    /// Interleaved frames on the RTSP connection itself (RFC 2326 §10.12).
    Interleaved { rtp_channel: u8, rtcp_channel: u8 },
}

impl TransportHeader {
    /// Parse the `Transport` header value (RFC 2326 §12.39).
    ///
    /// ## Examples
    ///
    /// ```
    /// use rtsp_proxy::protocol::transport::TransportHeader;
    ///
    /// let th = TransportHeader::parse("RTP/AVP;unicast;client_port=8000-8001").unwrap();
    /// assert_eq!(
    ///     th,
    ///     TransportHeader::Udp { client_rtp_port: 8000, client_rtcp_port: 8001 }
    /// );
    ///
    /// let th = TransportHeader::parse("RTP/AVP/TCP;unicast;interleaved=2-3").unwrap();
    /// assert_eq!(th, TransportHeader::Interleaved { rtp_channel: 2, rtcp_channel: 3 });
    ///
    /// assert!(TransportHeader::parse("RTP/AVP;multicast").is_none());
    /// ```
    pub fn parse(header: &str) -> Option<Self> {
        let mut udp = None;

        for part in header.split(';') {
            let part = part.trim();
            if let Some(channels) = part.strip_prefix("interleaved=") {
                let (rtp_channel, rtcp_channel) = parse_channel_pair(channels)?;
                return Some(TransportHeader::Interleaved {
                    rtp_channel,
                    rtcp_channel,
                });
            }
            if let Some(ports) = part.strip_prefix("client_port=") {
                let (client_rtp_port, client_rtcp_port) = parse_port_pair(ports)?;
                udp = Some(TransportHeader::Udp {
                    client_rtp_port,
                    client_rtcp_port,
                });
            }
        }

        udp
    }
}

/// `a-b` channel pair; a lone `a` means `a` and `a + 1`.
fn parse_channel_pair(raw: &str) -> Option<(u8, u8)> {
    match raw.split_once('-') {
        Some((first, second)) => Some((first.parse().ok()?, second.parse().ok()?)),
        None => {
            let first: u8 = raw.parse().ok()?;
            Some((first, first.checked_add(1)?))
        }
    }
}

/// `a-b` port pair; a lone `a` means `a` and `a + 1`.
fn parse_port_pair(raw: &str) -> Option<(u16, u16)> {
    match raw.split_once('-') {
        Some((first, second)) => Some((first.parse().ok()?, second.parse().ok()?)),
        None => {
            let first: u16 = raw.parse().ok()?;
            Some((first, first.checked_add(1)?))
        }
    }
}
