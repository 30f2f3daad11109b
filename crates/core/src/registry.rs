use std::collections::HashMap;
use std::sync::Arc;

use crate::config::StreamConfig;

/// Registry of proxied streams, keyed by downstream path.
///
/// Built once from the validated configuration before the server starts
/// and read-only afterwards, so lookups take no locks. A stream named
/// `cam1` is reachable at path `/cam1`; there is no fallback for unknown
/// paths — the connection handler closes those without a response.
#[derive(Clone)]
pub struct StreamRegistry {
    streams: Arc<HashMap<String, Arc<StreamConfig>>>,
}

impl StreamRegistry {
    pub fn new(configs: Vec<StreamConfig>) -> Self {
        let mut streams = HashMap::with_capacity(configs.len());
        for config in configs {
            let path = format!("/{}", config.name);
            streams.insert(path, Arc::new(config));
        }
        Self {
            streams: Arc::new(streams),
        }
    }

    /// Look up a stream by exact path.
    pub fn resolve(&self, path: &str) -> Option<Arc<StreamConfig>> {
        self.streams.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Extract the stream path from an RTSP URI.
///
/// `rtsp://host:8554/cam1/trackID=0` → `/cam1`
/// `rtsp://host:8554/cam1`           → `/cam1`
/// `rtsp://host:8554`                → `/`
/// `/cam1`                           → `/cam1`
pub fn extract_path(uri: &str) -> &str {
    let path = if let Some(after) = uri
        .strip_prefix("rtsp://")
        .or_else(|| uri.strip_prefix("rtsps://"))
    {
        match after.find('/') {
            Some(slash) => &after[slash..],
            None => "/",
        }
    } else if uri.starts_with('/') {
        uri
    } else {
        "/"
    };

    // Strip track suffix: /cam1/trackID=0 → /cam1
    match path.rfind("/trackID=") {
        Some(pos) if pos > 0 => &path[..pos],
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str) -> StreamConfig {
        StreamConfig {
            name: name.to_string(),
            url: "rtsp://10.0.0.5/stream".parse().unwrap(),
            fix_force_tcp_in_transport: false,
        }
    }

    #[test]
    fn extract_path_full_uri() {
        assert_eq!(extract_path("rtsp://localhost:8554/cam1"), "/cam1");
    }

    #[test]
    fn extract_path_with_track() {
        assert_eq!(
            extract_path("rtsp://localhost:8554/cam1/trackID=0"),
            "/cam1"
        );
    }

    #[test]
    fn extract_path_nested() {
        assert_eq!(
            extract_path("rtsp://10.0.0.1:8554/cam1/trackID=12"),
            "/cam1"
        );
    }

    #[test]
    fn extract_path_no_path() {
        assert_eq!(extract_path("rtsp://localhost:8554"), "/");
    }

    #[test]
    fn extract_path_bare_path() {
        assert_eq!(extract_path("/camera1"), "/camera1");
    }

    #[test]
    fn extract_path_star() {
        assert_eq!(extract_path("*"), "/");
    }

    #[test]
    fn registry_resolves_configured_names() {
        let registry = StreamRegistry::new(vec![config("cam1"), config("cam2")]);
        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("/cam1").is_some());
        assert!(registry.resolve("/cam2").is_some());
        assert!(registry.resolve("/other").is_none());
        assert!(registry.resolve("cam1").is_none());
    }

    #[test]
    fn registry_has_no_fallback() {
        let registry = StreamRegistry::new(vec![config("cam1")]);
        assert!(registry.resolve("/").is_none());
        assert!(registry.resolve("/cam1/trackID=0").is_none());
    }
}
