//! Upstream URL composition.

use axum::http::Uri;

use crate::config::ProxySettings;
use crate::proxy::ProxyError;

/// Backend origin plus the fixed API root forwarded paths live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    origin: String,
    api_root: String,
}

impl UpstreamTarget {
    pub fn new(origin: &str, api_root: &str) -> Self {
        let root = api_root.trim_matches('/');
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            api_root: if root.is_empty() {
                String::new()
            } else {
                format!("/{root}")
            },
        }
    }

    pub fn from_settings(settings: &ProxySettings) -> Self {
        Self::new(&settings.backend_origin, &settings.api_root)
    }

    /// Path on the backend for an inbound suffix: `{api_root}/{suffix}`.
    pub fn path_for(&self, suffix: &str) -> String {
        format!("{}/{}", self.api_root, suffix.trim_start_matches('/'))
    }

    /// Absolute backend URI for an inbound suffix and optional query.
    pub fn uri_for(&self, suffix: &str, query: Option<&str>) -> Result<Uri, ProxyError> {
        let mut url = format!("{}{}", self.origin, self.path_for(suffix));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url.parse::<Uri>()
            .map_err(|e| ProxyError::InvalidTarget(format!("{url}: {e}")))
    }
}
