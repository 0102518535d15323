//! Client Configuration
//!
//! Built once at startup and handed to the API client; nothing reads backend
//! addresses from globals.

use serde::{Deserialize, Serialize};

use globe_core::land::DEFAULT_DOT_SPACING;

/// Natural Earth 1:110m land polygons
pub const DEFAULT_LAND_URL: &str = "https://raw.githubusercontent.com/martynafford/natural-earth-geojson/refs/heads/master/110m/physical/ne_110m_land.json";

/// Where the globe gets its land dots
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LandSource {
    /// Fetch GeoJSON and sample it on the client
    Sampled { url: String, dot_spacing: f64 },

    /// Fetch a point list baked ahead of time
    Precomputed { url: String },
}

impl Default for LandSource {
    fn default() -> Self {
        Self::Sampled {
            url: DEFAULT_LAND_URL.into(),
            dot_spacing: DEFAULT_DOT_SPACING,
        }
    }
}

/// Client configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub backend_url: String,

    /// Land dot source for the globe
    #[serde(default)]
    pub land_source: LandSource,

    /// Request timeout in seconds (ignored in the browser)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

const fn default_timeout() -> u64 {
    120
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".into(),
            land_source: LandSource::default(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ClientConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self::default().with_backend_url(backend_url)
    }

    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Read `ARTHIK_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, over any key lookup (compile-time values in WASM)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("ARTHIK_BACKEND_URL").filter(|u| !u.is_empty()) {
            config = config.with_backend_url(url);
        }

        config.land_source = if let Some(url) = lookup("ARTHIK_LAND_POINTS_URL").filter(|u| !u.is_empty()) {
            LandSource::Precomputed { url }
        } else {
            LandSource::Sampled {
                url: lookup("ARTHIK_LAND_URL")
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| DEFAULT_LAND_URL.into()),
                dot_spacing: lookup("ARTHIK_DOT_SPACING")
                    .and_then(|s| s.parse().ok())
                    .filter(|s: &f64| *s > 0.0)
                    .unwrap_or(DEFAULT_DOT_SPACING),
            }
        };

        if let Some(timeout) = lookup("ARTHIK_TIMEOUT_SECS").and_then(|t| t.parse().ok()) {
            config.timeout_secs = timeout;
        }

        config
    }

    /// Absolute URL for a backend path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.backend_url, path.trim_start_matches('/'))
    }
}
