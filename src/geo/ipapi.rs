//! HTTP client for ipapi-style geolocation services.
//!
//! Issues `GET {base_url}/{ip}/json/` and normalizes the JSON reply. The
//! payload is read field by field from a `serde_json::Value` so that an
//! unexpected shape for one field leaves that field absent instead of
//! discarding the whole answer.

use serde_json::{Map, Value};

use crate::config::GeolocationConfig;
use crate::geo::location::{ClientLocation, GeoLookup, LookupError};

/// Lookup backed by an ipapi-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct IpApiClient {
    http: reqwest::Client,
    base_url: String,
    enabled: bool,
}

impl IpApiClient {
    pub fn new(config: &GeolocationConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("edge-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled,
        })
    }

    /// Lookup URL for `ip`.
    pub fn endpoint(&self, ip: &str) -> String {
        format!("{}/{}/json/", self.base_url, ip)
    }
}

impl GeoLookup for IpApiClient {
    async fn lookup(&self, ip: &str) -> Result<ClientLocation, LookupError> {
        if !self.enabled {
            return Err(LookupError::Disabled);
        }

        let url = self.endpoint(ip);
        tracing::debug!(ip = %ip, url = %url, "Geolocation lookup");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        normalize(ip, &payload)
    }
}

/// Map a lookup payload onto a [`ClientLocation`].
///
/// Country name wins over country code and organisation wins over ISP.
pub fn normalize(ip: &str, payload: &Value) -> Result<ClientLocation, LookupError> {
    let fields = payload
        .as_object()
        .ok_or_else(|| LookupError::Decode(format!("expected a JSON object, got {payload}")))?;

    if fields.get("error").and_then(Value::as_bool) == Some(true) {
        let reason = text(fields, "reason").unwrap_or_else(|| "unspecified".to_string());
        return Err(LookupError::Rejected(reason));
    }

    Ok(ClientLocation {
        ip: ip.to_string(),
        country: text(fields, "country_name").or_else(|| text(fields, "country")),
        city: text(fields, "city"),
        region: text(fields, "region"),
        latitude: fields.get("latitude").and_then(Value::as_f64),
        longitude: fields.get("longitude").and_then(Value::as_f64),
        timezone: text(fields, "timezone"),
        isp: text(fields, "org").or_else(|| text(fields, "isp")),
    })
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
