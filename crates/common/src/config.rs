//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Serper search API key.
    #[serde(default)]
    pub serper_api_key: String,

    /// OpenAI API key.
    #[serde(default)]
    pub openai_api_key: String,

    /// Chat model used to summarize search results into HTML.
    #[serde(default = "default_model")]
    pub model: String,

    /// Provinces accepted by the API. Requests for anything else are rejected.
    #[serde(default = "default_provinces")]
    pub provinces: Vec<String>,

    /// HTTP server parameters.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Outbound HTTP parameters.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Bind address for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Report cache parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a cached report stays fresh (seconds).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

/// Outbound HTTP client parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for collaborator calls (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_ttl() -> u64 {
    1800
}

fn default_request_timeout() -> u64 {
    30
}

fn default_provinces() -> Vec<String> {
    [
        "กรุงเทพมหานคร",
        "เชียงใหม่",
        "เชียงราย",
        "ขอนแก่น",
        "ชลบุรี",
        "นครราชสีมา",
        "นครศรีธรรมราช",
        "ภูเก็ต",
        "สงขลา",
        "สุราษฎร์ธานี",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            serper_api_key: String::new(),
            openai_api_key: String::new(),
            model: default_model(),
            provinces: default_provinces(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
        }
    }
}
