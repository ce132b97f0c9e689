//! Cloudflare API v4 client implementing the `DnsApi` port.
//!
//! Every response is checked twice: HTTP status (401/403 mean the token is
//! bad) and the `success`/`errors[]` envelope, which Cloudflare can set to
//! failure on a 200.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{DnsApi, DnsConnector};
use crate::domain::dns::{DnsRecord, DnsZone, NewDnsRecord};
use crate::domain::error::{LifecycleError, ProviderError};

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Zones requested per page; 50 is the API maximum.
const ZONES_PER_PAGE: u32 = 50;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
}

/// Cloudflare client bound to one API token.
pub struct CloudflareClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl CloudflareClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, CLOUDFLARE_API_BASE)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("siteio/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<Envelope<T>> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| provider(ProviderError::Api(format!("{what}: {e}"))))?;
        let status = response.status();
        tracing::debug!(what, %status, "cloudflare response");
        let body = response
            .text()
            .await
            .map_err(|e| provider(ProviderError::Api(format!("{what}: {e}"))))?;
        parse_envelope(status, &body, what).map_err(provider)
    }
}

fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    what: &str,
) -> Result<Envelope<T>, ProviderError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProviderError::AuthInvalid);
    }
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        ProviderError::Api(format!("{what}: unexpected response (HTTP {status}): {e}"))
    })?;
    if !envelope.success || !status.is_success() {
        let messages = envelope
            .errors
            .iter()
            .map(|m| match m.code {
                Some(code) => format!("{} (code {code})", m.message),
                None => m.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        let detail = if messages.is_empty() {
            format!("HTTP {status}")
        } else {
            messages
        };
        return Err(ProviderError::Api(format!("{what}: {detail}")));
    }
    Ok(envelope)
}

fn require_result<T>(envelope: Envelope<T>, what: &str) -> Result<T> {
    envelope
        .result
        .ok_or_else(|| provider(ProviderError::Api(format!("{what}: response has no result"))))
}

fn provider(err: ProviderError) -> anyhow::Error {
    LifecycleError::Provider(err).into()
}

impl DnsApi for CloudflareClient {
    async fn list_zones(&self) -> Result<Vec<DnsZone>> {
        let mut zones = Vec::new();
        let mut page = 1;
        loop {
            let request = self.http.get(format!("{}/zones", self.base_url)).query(&[
                ("page", page.to_string()),
                ("per_page", ZONES_PER_PAGE.to_string()),
            ]);
            let envelope: Envelope<Vec<DnsZone>> = self.send(request, "listing zones").await?;
            let info = envelope.result_info.as_ref().map(|i| (i.page, i.total_pages));
            zones.extend(require_result(envelope, "listing zones")?);
            match info {
                Some((current, total)) if current < total => page = current + 1,
                _ => break,
            }
        }
        Ok(zones)
    }

    async fn find_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Vec<DnsRecord>> {
        let request = self
            .http
            .get(format!("{}/zones/{zone_id}/dns_records", self.base_url))
            .query(&[("name", name), ("type", record_type)]);
        let envelope = self.send(request, "looking up DNS records").await?;
        require_result(envelope, "looking up DNS records")
    }

    async fn create_record(&self, zone_id: &str, record: &NewDnsRecord) -> Result<DnsRecord> {
        let request = self
            .http
            .post(format!("{}/zones/{zone_id}/dns_records", self.base_url))
            .json(record);
        let envelope = self.send(request, "creating DNS record").await?;
        require_result(envelope, "creating DNS record")
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let request = self.http.delete(format!(
            "{}/zones/{zone_id}/dns_records/{record_id}",
            self.base_url
        ));
        let _: Envelope<serde_json::Value> = self.send(request, "deleting DNS record").await?;
        Ok(())
    }
}

/// Builds a [`CloudflareClient`] per token.
pub struct CloudflareConnector;

impl DnsConnector for CloudflareConnector {
    type Api = CloudflareClient;

    fn connect(&self, token: &str) -> Result<CloudflareClient> {
        CloudflareClient::new(token)
    }
}
