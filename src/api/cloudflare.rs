use super::{client::DnsApiClient, models::*};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::json;

const API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

pub struct CloudflareClient {
    client: reqwest::Client,
    base_url: String,
}

impl CloudflareClient {
    pub fn new(api_token: &str) -> Result<Self> {
        Self::with_base_url(api_token, API_BASE_URL)
    }

    /// Build a client against a non-default API endpoint. Tests point this
    /// at a local mock server.
    pub fn with_base_url(api_token: &str, base_url: &str) -> Result<Self> {
        if api_token.is_empty() {
            anyhow::bail!("API token is empty");
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_token))
            .context("API token is not a valid header value")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Read a response body and unwrap the Cloudflare envelope, surfacing
    /// the raw body in parse errors since the API returns HTML on some
    /// gateway failures.
    async fn into_result<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let text = response.text().await?;

        let parsed: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            anyhow::anyhow!("failed to parse API response: {}. Response: {}", e, text)
        })?;

        if !parsed.success {
            return Err(anyhow::anyhow!("API request failed: {:?}", parsed.errors));
        }

        parsed
            .result
            .ok_or_else(|| anyhow::anyhow!("API response missing result field"))
    }
}

#[async_trait]
impl DnsApiClient for CloudflareClient {
    async fn zone_id_by_name(&self, domain: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/zones", self.base_url))
            .query(&[("name", domain)])
            .send()
            .await?;

        let zones: Vec<Zone> = Self::into_result(response).await?;

        zones
            .into_iter()
            .find(|zone| zone.name == domain)
            .map(|zone| zone.id)
            .ok_or_else(|| anyhow::anyhow!("no zone found for domain: {}", domain))
    }

    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>> {
        let response = self
            .client
            .get(format!("{}/zones/{}/dns_records", self.base_url, zone_id))
            .query(&[("name", name)])
            .send()
            .await?;

        Self::into_result(response).await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<DnsRecord> {
        let response = self
            .client
            .post(format!("{}/zones/{}/dns_records", self.base_url, zone_id))
            .json(&json!({
                "type": "A",
                "name": name,
                "content": content,
                "ttl": ttl,
            }))
            .send()
            .await?;

        Self::into_result(response).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<DnsRecord> {
        let response = self
            .client
            .patch(format!(
                "{}/zones/{}/dns_records/{}",
                self.base_url, zone_id, record_id
            ))
            .json(&json!({
                "type": "A",
                "name": name,
                "content": content,
                "ttl": ttl,
            }))
            .send()
            .await?;

        Self::into_result(response).await
    }
}
