use std::fmt;

/// A parsed `Range` header (RFC 2326 §12.29).
///
/// PLAY requests must carry one; the proxy validates it before anything is
/// forwarded upstream, and re-serializes it with
/// [`header_value`](Self::header_value) for the origin. Only the `npt` and
/// `clock` units are accepted; `clock` values are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Range {
    /// Normal play time: `npt=now-`, `npt=0.000-`, `npt=2.5-7`,
    /// `npt=00:01:30-`. A `None` start means `now`.
    Npt { start: Option<f64>, end: Option<f64> },
    /// Absolute UTC time: `clock=20260101T000000Z-`.
    Clock { start: String, end: Option<String> },
}

/// Why a `Range` header value was rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid range value: {0:?}")]
    Invalid(String),
    #[error("unsupported range unit: {0:?}")]
    UnsupportedUnit(String),
    #[error("invalid npt time: {0:?}")]
    InvalidTime(String),
}

impl Range {
    pub fn parse(value: &str) -> Result<Self, RangeError> {
        let value = value.trim();
        let (unit, rest) = value
            .split_once('=')
            .ok_or_else(|| RangeError::Invalid(value.to_string()))?;

        match unit {
            "npt" => {
                let (start, end) = rest
                    .split_once('-')
                    .ok_or_else(|| RangeError::Invalid(value.to_string()))?;
                let start = match start {
                    "now" | "" => None,
                    s => Some(parse_npt_time(s)?),
                };
                let end = match end {
                    "" => None,
                    s => Some(parse_npt_time(s)?),
                };
                Ok(Range::Npt { start, end })
            }
            "clock" => {
                let (start, end) = rest
                    .split_once('-')
                    .ok_or_else(|| RangeError::Invalid(value.to_string()))?;
                if start.is_empty() {
                    return Err(RangeError::Invalid(value.to_string()));
                }
                let end = if end.is_empty() {
                    None
                } else {
                    Some(end.to_string())
                };
                Ok(Range::Clock {
                    start: start.to_string(),
                    end,
                })
            }
            other => Err(RangeError::UnsupportedUnit(other.to_string())),
        }
    }

    /// Wire form for the upstream request.
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range::Npt { start, end } => {
                write!(f, "npt=")?;
                match start {
                    Some(s) => write!(f, "{s}-")?,
                    None => write!(f, "now-")?,
                }
                if let Some(e) = end {
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            Range::Clock { start, end } => {
                write!(f, "clock={start}-")?;
                if let Some(e) = end {
                    write!(f, "{e}")?;
                }
                Ok(())
            }
        }
    }
}

/// `npt-time`: seconds with optional fraction, or `hh:mm:ss[.fraction]`.
fn parse_npt_time(raw: &str) -> Result<f64, RangeError> {
    let invalid = || RangeError::InvalidTime(raw.to_string());

    if raw.contains(':') {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let hours: f64 = parts[0].parse().map_err(|_| invalid())?;
        let minutes: f64 = parts[1].parse().map_err(|_| invalid())?;
        let seconds: f64 = parts[2].parse().map_err(|_| invalid())?;
        if minutes >= 60.0 || seconds >= 60.0 {
            return Err(invalid());
        }
        Ok(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        let seconds: f64 = raw.parse().map_err(|_| invalid())?;
        if seconds < 0.0 || !seconds.is_finite() {
            return Err(invalid());
        }
        Ok(seconds)
    }
}
