use crate::error::{ParseErrorKind, ProxyError};

/// An RTSP response (RFC 2326 §7).
///
/// Used in both directions: built with the builder methods when answering
/// downstream players, parsed with [`parse_head`](Self::parse_head) when
/// reading origin replies. Serializes to the standard text format:
///
/// ```text
/// RTSP/1.0 200 OK\r\n
/// CSeq: 1\r\n
/// Content-Type: application/sdp\r\n
/// Content-Length: 142\r\n
/// \r\n
/// v=0\r\n...
/// ```
///
/// Chain [`add_header`](Self::add_header) and [`with_body`](Self::with_body),
/// then call [`serialize`](Self::serialize). `Content-Length` is computed
/// automatically when a body is present.
#[must_use]
#[derive(Debug)]
pub struct RtspResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Identification string included as `Server` in every downstream response
/// (RFC 2326 §12.36) and as `User-Agent` on every upstream request
/// (RFC 2326 §12.41).
pub const PROXY_AGENT: &str = "rtsp-proxy-rs/0.1";

impl RtspResponse {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        RtspResponse {
            status_code,
            status_text: status_text.to_string(),
            headers: vec![("Server".to_string(), PROXY_AGENT.to_string())],
            body: Vec::new(),
        }
    }

    /// 200 OK — success (RFC 2326 §7.1.1).
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    /// 400 Bad Request — malformed or missing required header.
    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request")
    }

    /// 501 Not Implemented — method outside the proxied set.
    pub fn not_implemented() -> Self {
        Self::new(501, "Not Implemented")
    }

    /// 504 Gateway error — the upstream exchange failed.
    pub fn gateway_error() -> Self {
        Self::new(504, "Gateway error")
    }

    /// 500 Internal error — a proxy-side invariant did not hold.
    pub fn internal_error() -> Self {
        Self::new(500, "Internal error")
    }

    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header value by name (case-insensitive, per RFC 2326 §4.2).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Announced body length, or 0 when absent or unparseable.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Parse a response head: status line, headers, trailing blank line.
    ///
    /// The body is not consumed here; the upstream reader attaches it
    /// after reading `Content-Length` bytes off the socket.
    pub fn parse_head(raw: &str) -> crate::error::Result<Self> {
        let mut lines = raw.lines();

        let status_line = lines.next().ok_or(ProxyError::Parse {
            kind: ParseErrorKind::InvalidStatusLine,
        })?;

        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap_or("");
        let code = parts.next().ok_or(ProxyError::Parse {
            kind: ParseErrorKind::InvalidStatusLine,
        })?;
        let status_text = parts.next().unwrap_or("").trim().to_string();

        if !version.starts_with("RTSP/") {
            return Err(ProxyError::Parse {
                kind: ParseErrorKind::InvalidStatusLine,
            });
        }
        let status_code: u16 = code.parse().map_err(|_| ProxyError::Parse {
            kind: ParseErrorKind::InvalidStatusCode,
        })?;

        let mut headers = Vec::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            let colon_pos = line.find(':').ok_or(ProxyError::Parse {
                kind: ParseErrorKind::InvalidHeader,
            })?;
            let name = line[..colon_pos].trim().to_string();
            let value = line[colon_pos + 1..].trim().to_string();
            headers.push((name, value));
        }

        Ok(RtspResponse {
            status_code,
            status_text,
            headers,
            body: Vec::new(),
        })
    }

    /// Serialize to the RTSP wire format.
    ///
    /// If a body is present, `Content-Length` is appended automatically
    /// (RFC 2326 §12.14).
    pub fn serialize(&self) -> Vec<u8> {
        let mut head = format!("RTSP/1.0 {} {}\r\n", self.status_code, self.status_text);

        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }

        if !self.body.is_empty() {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        head.push_str("\r\n");

        let mut wire = head.into_bytes();
        wire.extend_from_slice(&self.body);
        wire
    }
}
