//! `PublicIpResolver` backed by an IP echo service.

use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::PublicIpResolver;

pub const IPIFY_URL: &str = "https://api.ipify.org";

/// Asks an echo service which IPv4 address this host's requests come from.
pub struct IpifyResolver {
    url: String,
}

impl IpifyResolver {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for IpifyResolver {
    fn default() -> Self {
        Self::new(IPIFY_URL)
    }
}

impl PublicIpResolver for IpifyResolver {
    async fn public_ipv4(&self) -> Result<String> {
        let body = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building HTTP client")?
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("querying {}", self.url))?
            .error_for_status()
            .with_context(|| format!("querying {}", self.url))?
            .text()
            .await
            .with_context(|| format!("reading response from {}", self.url))?;
        let ip = parse_ipv4(&body)?;
        tracing::debug!(%ip, "resolved public IP");
        Ok(ip.to_string())
    }
}

fn parse_ipv4(body: &str) -> Result<Ipv4Addr> {
    body.trim()
        .parse::<Ipv4Addr>()
        .with_context(|| format!("IP service returned '{}', not an IPv4 address", body.trim()))
}
