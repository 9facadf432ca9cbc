//! The dynamic DNS reconciler.
//!
//! `DynamicDns` resolves (or creates) the managed "A" record at construction
//! time, then runs a timer-driven loop that compares the observed external
//! IP against the record content captured at construction and pushes an
//! update when they differ.

use crate::api::{CloudflareClient, DnsApiClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lookup;
use log::{debug, error, info, warn};
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cloudflare interprets TTL 1 as "automatic".
const CREATE_RECORD_TTL: u32 = 1;

/// How long `stop()` waits for the loop task to observe cancellation.
const STOP_GRACE_PERIOD: Duration = Duration::from_millis(100);

/// Identity and captured content of the managed record.
///
/// `content` is the comparison baseline for refreshes. It is captured once
/// at construction and deliberately never updated after a successful push,
/// matching the long-standing behavior of this daemon; the authoritative
/// value always lives at the provider.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    pub zone_id: String,
    pub record_id: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
}

enum LoopState {
    Idle,
    Running {
        shutdown: oneshot::Sender<()>,
        handle: JoinHandle<()>,
    },
    Stopped,
}

pub struct DynamicDns {
    api: Arc<dyn DnsApiClient>,
    http: reqwest::Client,
    record: RecordHandle,
    ip_lookup_url: String,
    refresh_interval: Duration,
    state: LoopState,
}

impl DynamicDns {
    /// Build a reconciler against the real Cloudflare API.
    ///
    /// Blocks on the network: resolves the zone ID, locates the record for
    /// `host.domain`, and creates it from the currently observed external IP
    /// if it does not exist. All failures here are fatal to startup.
    pub async fn new(config: &Config) -> Result<Self> {
        let api =
            CloudflareClient::new(&config.api_token).map_err(|e| Error::Auth(e.to_string()))?;

        Self::with_client(Arc::new(api), config).await
    }

    pub(crate) async fn with_client(api: Arc<dyn DnsApiClient>, config: &Config) -> Result<Self> {
        let refresh_interval = match parse_refresh_interval(&config.refresh_interval) {
            Some(interval) => interval,
            None => {
                warn!(
                    "failed to parse requested interval duration; using default \
                     requested_interval={:?} default_interval={:?}",
                    config.refresh_interval, DEFAULT_REFRESH_INTERVAL
                );
                DEFAULT_REFRESH_INTERVAL
            }
        };

        let http = reqwest::Client::new();

        let zone_id = api.zone_id_by_name(&config.domain).await.map_err(|e| {
            Error::ZoneResolution {
                domain: config.domain.clone(),
                message: e.to_string(),
            }
        })?;

        let fqdn = format!("{}.{}", config.host, config.domain);

        let records =
            api.list_records(&zone_id, &fqdn)
                .await
                .map_err(|e| Error::RecordQuery {
                    fqdn: fqdn.clone(),
                    message: e.to_string(),
                })?;

        let existing = records.into_iter().find(|record| record.name == fqdn);

        info!(
            "initial state fqdn={} ip={} refresh_interval={:?} exists={}",
            fqdn,
            existing.as_ref().map(|r| r.content.as_str()).unwrap_or(""),
            refresh_interval,
            existing.is_some()
        );

        let record = match existing {
            Some(record) => record,
            None => {
                let current_ip = lookup::external_ip(&http, &config.ip_lookup_url)
                    .await
                    .map_err(|e| Error::IpLookup {
                        url: config.ip_lookup_url.clone(),
                        message: e.to_string(),
                    })?;

                info!("creating missing DNS record fqdn={} ip={}", fqdn, current_ip);

                api.create_record(&zone_id, &fqdn, &current_ip, CREATE_RECORD_TTL)
                    .await
                    .map_err(|e| Error::RecordCreate {
                        fqdn: fqdn.clone(),
                        message: e.to_string(),
                    })?
            }
        };

        Ok(Self {
            api,
            http,
            record: RecordHandle {
                zone_id,
                record_id: record.id,
                name: record.name,
                content: record.content,
                ttl: record.ttl,
            },
            ip_lookup_url: config.ip_lookup_url.clone(),
            refresh_interval,
            state: LoopState::Idle,
        })
    }

    pub fn record(&self) -> &RecordHandle {
        &self.record
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Run a single reconciliation pass. Best effort, no retry; the caller
    /// decides what a failure means.
    pub async fn refresh(&self) -> Result<()> {
        reconcile(
            self.api.as_ref(),
            &self.http,
            &self.record,
            &self.ip_lookup_url,
        )
        .await
    }

    /// Begin the reconciliation loop. Valid only from the idle state;
    /// calling it again (or after `stop()`) is a logged no-op.
    ///
    /// One reconciliation runs immediately, with its outcome logged but
    /// never treated as fatal. The loop task then waits a full interval
    /// before the first timer fire.
    pub async fn start(&mut self) {
        if !matches!(self.state, LoopState::Idle) {
            debug!("start ignored: reconciliation loop already started");
            return;
        }

        info!("starting");

        if let Err(e) = self.refresh().await {
            error!("failed to refresh dynamic DNS: {}", e);
        }

        let (shutdown, mut shutdown_rx) = oneshot::channel();

        let api = Arc::clone(&self.api);
        let http = self.http.clone();
        let record = self.record.clone();
        let ip_lookup_url = self.ip_lookup_url.clone();
        let period = self.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("cancellation received");
                        return;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) =
                            reconcile(api.as_ref(), &http, &record, &ip_lookup_url).await
                        {
                            error!("failed to refresh dynamic DNS: {}", e);
                        }
                    }
                }
            }
        });

        self.state = LoopState::Running { shutdown, handle };
    }

    /// Cancel the loop and wait briefly for it to exit. Valid only while
    /// running; afterwards the instance is terminally stopped.
    ///
    /// A reconciliation already in flight runs to completion; cancellation
    /// is only observed at the loop's wait point.
    pub async fn stop(&mut self) {
        match mem::replace(&mut self.state, LoopState::Stopped) {
            LoopState::Running { shutdown, handle } => {
                info!("stopping");

                let _ = shutdown.send(());

                match time::timeout(STOP_GRACE_PERIOD, handle).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("reconciliation loop task failed: {}", e),
                    Err(_) => warn!(
                        "reconciliation loop did not stop within {:?}",
                        STOP_GRACE_PERIOD
                    ),
                }

                info!("stopped");
            }
            other => {
                debug!("stop ignored: reconciliation loop is not running");
                self.state = other;
            }
        }
    }
}

/// One reconciliation pass: observe the external IP, compare it
/// byte-for-byte against the captured record content, push an update on
/// drift. The captured content is not modified.
async fn reconcile(
    api: &dyn DnsApiClient,
    http: &reqwest::Client,
    record: &RecordHandle,
    ip_lookup_url: &str,
) -> Result<()> {
    let current_ip =
        lookup::external_ip(http, ip_lookup_url)
            .await
            .map_err(|e| Error::IpLookup {
                url: ip_lookup_url.to_string(),
                message: e.to_string(),
            })?;

    let update_required = current_ip != record.content;

    info!(
        "refresh fqdn={} previous={} current={} update_required={}",
        record.name, record.content, current_ip, update_required
    );

    if update_required {
        api.update_record(
            &record.zone_id,
            &record.record_id,
            &record.name,
            &current_ip,
            record.ttl,
        )
        .await
        .map_err(|e| Error::RecordUpdate {
            fqdn: record.name.clone(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}

/// Parse a Go-style duration string ("24h", "90m", "1h30m", "500ms").
/// Returns `None` for anything unparseable or zero, letting the caller
/// substitute the default interval.
pub(crate) fn parse_refresh_interval(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let bytes = input.as_bytes();
    let mut total = Duration::ZERO;
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let value: u64 = input[start..i].parse().ok()?;

        let unit_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_digit() {
            i += 1;
        }
        let segment = match &input[unit_start..i] {
            "ns" => Duration::from_nanos(value),
            "us" | "µs" => Duration::from_micros(value),
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.checked_mul(60)?),
            "h" => Duration::from_secs(value.checked_mul(3600)?),
            _ => return None,
        };

        total = total.checked_add(segment)?;
    }

    if total.is_zero() {
        None
    } else {
        Some(total)
    }
}
