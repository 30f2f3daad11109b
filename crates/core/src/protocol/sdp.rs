//! SDP reading for proxied descriptions (RFC 8866).
//!
//! The proxy never generates SDP. It parses just enough of the origin's
//! DESCRIBE body to enumerate media sections and their control attributes,
//! and hands the raw text through to downstream players untouched.

use url::Url;

/// Why an origin DESCRIBE body was rejected.
#[derive(Debug, thiserror::Error)]
pub enum SdpError {
    #[error("session description is not valid UTF-8")]
    NotUtf8,
}

/// A parsed session description.
///
/// Unknown lines are skipped rather than rejected; cameras routinely emit
/// non-standard attributes and the proxy only needs the media inventory.
#[derive(Debug, Clone)]
pub struct SessionDescription {
    raw: String,
    /// Session-level `a=control:` value, if any.
    pub control: Option<String>,
    /// Media sections in declaration order. The index in this vector is
    /// the track index used in `trackID=` SETUP paths.
    pub media: Vec<MediaDescription>,
}

/// One `m=` section of a session description.
#[derive(Debug, Clone)]
pub struct MediaDescription {
    /// Media kind from the `m=` line: `video`, `audio`, `application`, ...
    pub kind: String,
    /// `a=control:` value within this section, if any.
    pub control: Option<String>,
}

impl SessionDescription {
    pub fn parse(body: &[u8]) -> Result<Self, SdpError> {
        let raw = std::str::from_utf8(body).map_err(|_| SdpError::NotUtf8)?;

        let mut control = None;
        let mut media: Vec<MediaDescription> = Vec::new();

        for line in raw.lines() {
            let line = line.trim_end();
            if let Some(rest) = line.strip_prefix("m=") {
                let kind = rest.split_whitespace().next().unwrap_or("").to_string();
                media.push(MediaDescription {
                    kind,
                    control: None,
                });
            } else if let Some(value) = line.strip_prefix("a=control:") {
                let value = value.trim().to_string();
                match media.last_mut() {
                    Some(section) => section.control = Some(value),
                    None => control = Some(value),
                }
            }
        }

        Ok(SessionDescription {
            raw: raw.to_string(),
            control,
            media,
        })
    }

    /// The description text as received from the origin.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Number of media sections, which bounds valid track indices.
    pub fn media_count(&self) -> usize {
        self.media.len()
    }
}

/// Resolve a media control attribute against a base URL (RFC 2326 §C.1.1).
///
/// `*` or a missing attribute refers to the base itself; absolute `rtsp://`
/// values are taken as-is; anything else is joined onto the base path. A
/// value that fails to resolve falls back to the base with a warning, so a
/// broken attribute degrades to aggregate control instead of failing SETUP.
pub fn resolve_control(base: &Url, control: Option<&str>) -> Url {
    let control = match control {
        None | Some("*") | Some("") => return base.clone(),
        Some(c) => c,
    };

    if control.starts_with("rtsp://") || control.starts_with("rtsps://") {
        return match Url::parse(control) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(control, error = %e, "unparseable absolute control URL");
                base.clone()
            }
        };
    }

    // Relative controls append to the base path, so the base must end in
    // a separator before joining: rtsp://h/cam + trackID=0
    // → rtsp://h/cam/trackID=0.
    let mut slashed = base.clone();
    if !slashed.path().ends_with('/') {
        let path = format!("{}/", slashed.path());
        slashed.set_path(&path);
    }
    match slashed.join(control) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(control, error = %e, "unresolvable control attribute");
            base.clone()
        }
    }
}
