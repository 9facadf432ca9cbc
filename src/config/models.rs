use anyhow::{Context, Result};
use std::env;

/// Runtime configuration, loaded once at startup and passed into the
/// reconciler. The core logic never reads the process environment itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cloudflare API token.
    pub api_token: String,

    /// Host label of the managed record ("home" in "home.example.com").
    pub host: String,

    /// Domain owning the zone ("example.com").
    pub domain: String,

    /// Endpoint whose GET response body is the current external IP.
    pub ip_lookup_url: String,

    /// Refresh interval as a duration string ("24h", "90m"). Invalid or
    /// empty values fall back to the default interval at construction.
    pub refresh_interval: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_token: required("CLOUDFLARE_API_KEY")?,
            host: required("DDNS_HOST")?,
            domain: required("DDNS_DOMAIN")?,
            ip_lookup_url: required("IP_LOOKUP_URL")?,
            refresh_interval: env::var("REFRESH_INTERVAL").unwrap_or_default(),
        })
    }
}

fn required(key: &str) -> Result<String> {
    let value = env::var(key)
        .with_context(|| format!("missing required environment variable: {}", key))?;

    if value.is_empty() {
        anyhow::bail!("environment variable {} is empty", key);
    }

    Ok(value)
}
