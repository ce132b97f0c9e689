//! Application service: wildcard DNS reconciliation.
//!
//! The wildcard record is reconciled toward "exists", never owned outright:
//! an existing record is left alone even when it points elsewhere.

use anyhow::{Context, Result};

use crate::application::ports::{DnsApi, PublicIpResolver};
use crate::domain::dns::{DnsOutcome, DnsZone, NewDnsRecord, select_zone, wildcard_name};
use crate::domain::error::{LifecycleError, ProviderError};

/// Ensure `*.<domain>` resolves to this host's public IPv4 address.
///
/// # Errors
///
/// Returns an error if the public IP cannot be resolved, no zone matches the
/// domain, or the provider rejects a request.
pub async fn setup_wildcard_dns(
    api: &impl DnsApi,
    ip: &impl PublicIpResolver,
    domain: &str,
) -> Result<DnsOutcome> {
    let public_ip = ip
        .public_ipv4()
        .await
        .context("cannot determine this host's public IP")?;
    let zone = resolve_zone(api, domain).await?;
    let name = wildcard_name(domain);

    let existing = api.find_records(&zone.id, &name, "A").await?;
    if let Some(record) = existing.first() {
        tracing::debug!(record = %name, target = %record.content, "wildcard record already present");
        return Ok(DnsOutcome::skipped(format!(
            "{name} already exists (points to {})",
            record.content
        )));
    }

    api.create_record(&zone.id, &NewDnsRecord::wildcard(domain, &public_ip))
        .await?;
    Ok(DnsOutcome::changed(format!(
        "Created {name} → {public_ip} in zone {}",
        zone.name
    )))
}

/// Remove the `*.<domain>` A record if it exists.
///
/// # Errors
///
/// Returns an error if no zone matches the domain or the provider rejects a
/// request.
pub async fn remove_wildcard_dns(api: &impl DnsApi, domain: &str) -> Result<DnsOutcome> {
    let zone = resolve_zone(api, domain).await?;
    let name = wildcard_name(domain);

    let existing = api.find_records(&zone.id, &name, "A").await?;
    if existing.is_empty() {
        return Ok(DnsOutcome::skipped(format!("{name} does not exist")));
    }
    for record in &existing {
        api.delete_record(&zone.id, &record.id).await?;
    }
    Ok(DnsOutcome::changed(format!("Removed {name}")))
}

async fn resolve_zone(api: &impl DnsApi, domain: &str) -> Result<DnsZone> {
    let zones = api.list_zones().await?;
    if zones.is_empty() {
        return Err(LifecycleError::Provider(ProviderError::Api(
            "no zones accessible with this token".to_string(),
        ))
        .into());
    }
    if let Some(zone) = select_zone(&zones, domain) {
        return Ok(zone.clone());
    }
    let available = zones
        .iter()
        .map(|z| z.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(LifecycleError::NotFound(format!(
        "no Cloudflare zone matches {domain}. Available zones: {available}"
    ))
    .into())
}
