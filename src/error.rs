use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the DDNS reconciler.
///
/// The `Auth`, `ZoneResolution`, `RecordQuery` and `RecordCreate` variants
/// only occur during construction and are fatal: the operator has to fix the
/// configuration and restart. `IpLookup` and `RecordUpdate` also occur during
/// steady-state refreshes, where they are logged and the next timer tick
/// retries naturally.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to create Cloudflare API client: {0}")]
    Auth(String),

    #[error("failed to resolve zone ID for domain {domain}: {message}")]
    ZoneResolution { domain: String, message: String },

    #[error("failed to retrieve DNS records for {fqdn}: {message}")]
    RecordQuery { fqdn: String, message: String },

    #[error("failed to look up external IP at {url}: {message}")]
    IpLookup { url: String, message: String },

    #[error("failed to create DNS record {fqdn}: {message}")]
    RecordCreate { fqdn: String, message: String },

    #[error("failed to update DNS record {fqdn}: {message}")]
    RecordUpdate { fqdn: String, message: String },
}
