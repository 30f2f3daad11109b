//! Error types for the RTSP proxy library.

use std::fmt;

/// Errors that can occur in the RTSP proxy library.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Protocol**: [`Parse`](Self::Parse) — malformed RTSP messages on the
///   downstream connection.
/// - **Transport**: [`Io`](Self::Io) — socket/network failures.
/// - **Dispatch**: [`PathNotFound`](Self::PathNotFound),
///   [`Sequence`](Self::Sequence), [`MalformedRequest`](Self::MalformedRequest).
/// - **Upstream**: [`Upstream`](Self::Upstream),
///   [`UpstreamStatus`](Self::UpstreamStatus).
/// - **Relay**: [`StreamClosed`](Self::StreamClosed),
///   [`RelayWrite`](Self::RelayWrite).
/// - **Server**: [`AlreadyRunning`](Self::AlreadyRunning),
///   [`Config`](Self::Config), [`Internal`](Self::Internal).
///
/// The request dispatcher maps these onto RTSP status codes: dispatch
/// errors become `400`, upstream errors become `504`, everything else that
/// reaches a response boundary becomes `500`. Only [`Config`](Self::Config)
/// is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid stream configuration. Rejected at startup, never at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// No stream configured at the requested path. The connection is
    /// closed without an RTSP response.
    #[error("no stream configured for path {0:?}")]
    PathNotFound(String),

    /// A method that requires an established proxied stream arrived before
    /// a successful DESCRIBE.
    #[error("you must call DESCRIBE before {method}")]
    Sequence { method: &'static str },

    /// The request is structurally valid RTSP but semantically unusable:
    /// bad track ID, missing or invalid Range header, and similar. The
    /// message text is returned verbatim as the response body.
    #[error("{0}")]
    MalformedRequest(String),

    /// The upstream exchange failed below the RTSP layer: connect,
    /// timeout, or a broken connection.
    #[error("{0}")]
    Upstream(String),

    /// The upstream answered with a non-2xx RTSP status.
    #[error("upstream returned {code} {message}")]
    UpstreamStatus { code: u16, message: String },

    /// A packet write raced the teardown of its proxied stream. Benign;
    /// logged and dropped by the relay.
    #[error("proxied stream is closed")]
    StreamClosed,

    /// A relayed packet could not be delivered downstream.
    #[error("relay write failed: {0}")]
    RelayWrite(String),

    /// [`Server::start`](crate::Server::start) was called while already running.
    #[error("server already running")]
    AlreadyRunning,

    /// Failed to parse an RTSP message (RFC 2326 §6).
    #[error("RTSP parse error: {kind}")]
    Parse { kind: ParseErrorKind },

    /// A state invariant the dispatcher relies on did not hold. Confined
    /// to the offending request; the connection keeps running.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Specific kind of RTSP parse failure.
#[derive(Debug)]
pub enum ParseErrorKind {
    /// Input was empty (no request line).
    EmptyRequest,
    /// Request line did not have the expected `Method URI Version` format.
    InvalidRequestLine,
    /// Status line did not have the expected `Version Code Reason` format.
    InvalidStatusLine,
    /// Status code was not a number.
    InvalidStatusCode,
    /// A header line did not contain a colon separator.
    InvalidHeader,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRequest => write!(f, "empty request"),
            Self::InvalidRequestLine => write!(f, "invalid request line"),
            Self::InvalidStatusLine => write!(f, "invalid status line"),
            Self::InvalidStatusCode => write!(f, "invalid status code"),
            Self::InvalidHeader => write!(f, "invalid header"),
        }
    }
}

/// Convenience alias for `Result<T, ProxyError>`.
pub type Result<T> = std::result::Result<T, ProxyError>;
