//! External IP lookup.
//!
//! Whatever the endpoint returns becomes the "current IP" string verbatim.
//! No format validation and no trimming: the reconciler compares the body
//! byte-for-byte against the record content, so services that append a
//! newline simply produce a different opaque string.

/// GET `url` and return the full response body as text.
///
/// The HTTP status is not inspected; only transport and body-read failures
/// are errors.
pub async fn external_ip(client: &reqwest::Client, url: &str) -> reqwest::Result<String> {
    let response = client.get(url).send().await?;
    response.text().await
}
