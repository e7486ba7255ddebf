//! Configuration loader — merges env vars, .env file, and config.toml.

use common::config::ApiConfig;
use common::Error;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &ApiConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.provinces.is_empty() {
        issues.push("provinces must contain at least one province".into());
    }
    if config.provinces.iter().any(|p| p.trim().is_empty()) {
        issues.push("provinces must not contain blank entries".into());
    }
    if config.model.trim().is_empty() {
        issues.push("model must not be empty".into());
    }
    if config.server.host.trim().is_empty() {
        issues.push("server.host must not be empty".into());
    }
    if config.server.port == 0 {
        issues.push("server.port must be > 0".into());
    }
    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }
    if config.http.request_timeout_secs == 0 {
        issues.push("http.request_timeout_secs must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load service configuration from environment and optional config file.
///
/// Missing API keys are logged but not fatal here — the collaborator call
/// fails at request time instead, and the rest of the API stays up.
pub fn load_config() -> Result<ApiConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = ApiConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("SERPER_API_KEY") {
        config.serper_api_key = key;
    }
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        config.openai_api_key = key;
    }
    if let Ok(model) = std::env::var("OPENAI_MODEL") {
        config.model = model;
    }
    if let Ok(raw) = std::env::var("WEATHER_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "WEATHER_CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("WEATHER_REQUEST_TIMEOUT_SECS") {
        config.http.request_timeout_secs = parse_positive_u64(&raw, "WEATHER_REQUEST_TIMEOUT_SECS")?;
    }
    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(raw) = std::env::var("PORT") {
        config.server.port = raw
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::Config("PORT must be an integer in 1-65535".into()))?;
    }

    // 5. Warn about missing credentials; requests needing them will fail.
    if config.serper_api_key.is_empty() {
        tracing::warn!("SERPER_API_KEY not set — weather search calls will fail");
    }
    if config.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY not set — summarization calls will fail");
    }

    validate_config(&config)?;

    Ok(config)
}
