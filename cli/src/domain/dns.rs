//! DNS zone and record types plus zone selection.
//!
//! Pure functions only: provider calls live behind `application::ports::DnsApi`.

use serde::{Deserialize, Serialize};

/// A DNS zone visible to the provider token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsZone {
    pub id: String,
    pub name: String,
}

/// An existing DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub content: String,
}

/// A record to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDnsRecord {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: String,
    pub content: String,
    /// `1` means automatic TTL.
    pub ttl: u32,
    pub proxied: bool,
}

impl NewDnsRecord {
    /// Wildcard `A` record for `domain` pointing straight at `ip`.
    ///
    /// Never proxied: the agent terminates TLS itself, so the record must
    /// resolve to the host.
    #[must_use]
    pub fn wildcard(domain: &str, ip: &str) -> Self {
        Self {
            record_type: "A",
            name: wildcard_name(domain),
            content: ip.to_string(),
            ttl: 1,
            proxied: false,
        }
    }
}

/// Result of a wildcard reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsOutcome {
    pub success: bool,
    pub message: String,
    pub skipped: bool,
}

impl DnsOutcome {
    #[must_use]
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            skipped: false,
        }
    }

    #[must_use]
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            skipped: true,
        }
    }
}

/// `*.<domain>`
#[must_use]
pub fn wildcard_name(domain: &str) -> String {
    format!("*.{domain}")
}

/// Pick the most specific zone that contains `domain`.
///
/// Zones are tried longest name first; a zone matches when it equals the
/// domain or is a suffix of it on a label boundary.
#[must_use]
pub fn select_zone<'a>(zones: &'a [DnsZone], domain: &str) -> Option<&'a DnsZone> {
    let mut sorted: Vec<&DnsZone> = zones.iter().collect();
    sorted.sort_by(|a, b| b.name.len().cmp(&a.name.len()));
    sorted.into_iter().find(|zone| {
        domain == zone.name || domain.ends_with(&format!(".{}", zone.name))
    })
}
