use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub content: String,
    pub r#type: String,
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

/// Cloudflare v4 response envelope.
///
/// `result` is null on failed requests, so callers must check `success`
/// before unwrapping it.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}
