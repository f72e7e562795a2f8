// # HomeCloud Announce Client
//
// This crate implements the agent's advertisement protocol: it resolves
// the host's IPv6 address at most once per process lifetime and announces
// it to the registration service on every scheduled tick.
//
// ## Protocol
//
// Two variants, selected by configuration:
//
// - Unauthenticated: `GET {service_url}/api/advertise`, no body.
// - Authenticated: `POST {service_url}/api/advertise` with an
//   `x-secret-key` header and the JSON body
//   `{"device":{"hostname":"homecloud","ipv6":"<address>"}}`.
//
// Success is exactly HTTP 200. Any other status is logged and tolerated;
// the next tick retries unconditionally. Transport failures surface as
// `Error::Transport` and are handled (logged) by the scheduler.
//
// ## Security
//
// The secret key never appears in logs or Debug output.

use async_trait::async_trait;
use homecloud_core::config::AgentConfig;
use homecloud_core::traits::{AddressResolver, PeriodicTask};
use homecloud_core::{Error, Result};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::net::Ipv6Addr;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Path of the announce endpoint, relative to the service URL
const ANNOUNCE_PATH: &str = "/api/advertise";

/// Header carrying the shared secret in the authenticated variant
const SECRET_KEY_HEADER: &str = "x-secret-key";

/// Device name announced to the registration service
const DEVICE_HOSTNAME: &str = "homecloud";

/// Connection-establishment timeout for announce requests
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Announce request payload (authenticated variant only)
#[derive(Debug, Serialize)]
struct AnnouncePayload {
    device: Device,
}

#[derive(Debug, Serialize)]
struct Device {
    hostname: &'static str,
    ipv6: String,
}

impl AnnouncePayload {
    fn new(address: Ipv6Addr) -> Self {
        Self {
            device: Device {
                hostname: DEVICE_HOSTNAME,
                ipv6: address.to_string(),
            },
        }
    }
}

/// Advertises the host's IPv6 address to the registration service
///
/// The resolved address is cached on first use and shared by all later
/// ticks. Resolution runs at most once per process lifetime, and a
/// not-found outcome is cached the same way: once the agent has an answer
/// it never re-enumerates interfaces.
pub struct Advertiser {
    service_url: String,
    secret_key: Option<String>,
    resolver: Box<dyn AddressResolver>,
    resolved: OnceCell<Option<Ipv6Addr>>,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the secret key
impl std::fmt::Debug for Advertiser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advertiser")
            .field("service_url", &self.service_url)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<REDACTED>"))
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

impl Advertiser {
    /// Create a new advertiser from the agent configuration.
    ///
    /// # Parameters
    ///
    /// - `config`: provides the service URL and the optional secret key
    /// - `resolver`: address resolver, invoked at most once
    pub fn new(config: &AgentConfig, resolver: Box<dyn AddressResolver>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            service_url: config.service_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            resolver,
            resolved: OnceCell::new(),
            client,
        })
    }

    /// The announce endpoint URL.
    fn announce_url(&self) -> String {
        format!("{}{}", self.service_url, ANNOUNCE_PATH)
    }

    /// Resolve the advertisable address, at most once per process lifetime.
    ///
    /// Both outcomes are cached: a successful resolution and a not-found
    /// one. Later ticks reuse whatever the first tick learned.
    async fn cached_address(&self) -> Option<Ipv6Addr> {
        *self
            .resolved
            .get_or_init(|| async {
                match self.resolver.resolve().await {
                    Ok(address) => {
                        info!("resolved advertisable IPv6 address: {address}");
                        Some(address)
                    }
                    Err(e) => {
                        warn!("IPv6 address resolution failed: {e}");
                        None
                    }
                }
            })
            .await
    }

    /// Build the announce request for the configured protocol variant.
    fn build_request(&self, address: Ipv6Addr) -> Result<reqwest::Request> {
        let url = self.announce_url();
        let builder = match &self.secret_key {
            None => self.client.get(&url),
            Some(key) => self
                .client
                .post(&url)
                .header(SECRET_KEY_HEADER, key)
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(&AnnouncePayload::new(address))?),
        };

        builder
            .build()
            .map_err(|e| Error::http(format!("failed to build announce request: {e}")))
    }

    /// Announce the cached address to the registration service.
    ///
    /// # Errors
    ///
    /// - `Error::Resolve`: no advertisable address is known; no request is
    ///   issued for this tick
    /// - `Error::Transport`: the announce call failed at the network level
    ///
    /// A response status other than 200 is logged as an error and reported
    /// as success; the next scheduled tick retries unconditionally.
    pub async fn advertise(&self) -> Result<()> {
        let Some(address) = self.cached_address().await else {
            return Err(Error::resolve("no advertisable IPv6 address known"));
        };

        let request = self.build_request(address)?;
        info!("advertising to {}", request.url());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::transport(format!("announce request failed: {e}")))?;

        if response.status() == StatusCode::OK {
            debug!("announce accepted");
        } else {
            error!("announce rejected with status {}", response.status());
        }
        Ok(())
    }
}

#[async_trait]
impl PeriodicTask for Advertiser {
    fn task_name(&self) -> &'static str {
        "advertise"
    }

    async fn run_once(&self) -> Result<()> {
        self.advertise().await
    }
}
