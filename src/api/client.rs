use super::models::DnsRecord;
use anyhow::Result;
use async_trait::async_trait;

/// The subset of a DNS provider's record API the reconciler needs.
#[async_trait]
pub trait DnsApiClient: Send + Sync {
    /// Resolve the provider's internal zone identifier for a domain.
    async fn zone_id_by_name(&self, domain: &str) -> Result<String>;

    /// List the records in a zone matching a fully-qualified name.
    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>>;

    /// Create an "A" record and return it as stored by the provider.
    async fn create_record(
        &self,
        zone_id: &str,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<DnsRecord>;

    /// Overwrite an existing record's content.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<DnsRecord>;
}
