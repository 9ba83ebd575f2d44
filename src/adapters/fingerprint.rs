use crate::domain::ports::HostFingerprint;
use crate::utils::error::{HarvestError, Result};
use regex::Regex;
use sysinfo::Networks;

const UNSPECIFIED_MAC: &str = "00:00:00:00:00:00";

/// Normalize a MAC address to lowercase, colon-separated form.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let re = Regex::new(r"^([0-9A-Fa-f]{2}[-:]){5}[0-9A-Fa-f]{2}$").ok()?;
    let trimmed = raw.trim();
    if !re.is_match(trimmed) {
        return None;
    }
    Some(trimmed.replace('-', ":").to_lowercase())
}

/// Hardware address of the first non-loopback interface, by interface name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoFingerprint;

impl HostFingerprint for SysinfoFingerprint {
    fn fingerprint(&self) -> Result<String> {
        let networks = Networks::new_with_refreshed_list();

        let mut candidates: Vec<(String, String)> = networks
            .list()
            .iter()
            .filter_map(|(name, data)| {
                let mac = normalize_mac(&data.mac_address().to_string())?;
                (mac != UNSPECIFIED_MAC).then(|| (name.clone(), mac))
            })
            .collect();
        candidates.sort();

        match candidates.into_iter().next() {
            Some((interface, mac)) => {
                tracing::debug!("Using MAC of interface {} as host fingerprint", interface);
                Ok(mac)
            }
            None => Err(HarvestError::FingerprintUnavailable {
                reason: "no network interface reports a hardware address".to_string(),
            }),
        }
    }
}

/// Fingerprint supplied through configuration.
#[derive(Debug, Clone)]
pub struct StaticFingerprint(pub String);

impl HostFingerprint for StaticFingerprint {
    fn fingerprint(&self) -> Result<String> {
        normalize_mac(&self.0).ok_or_else(|| HarvestError::FingerprintUnavailable {
            reason: format!("'{}' is not a MAC address", self.0),
        })
    }
}

/// Picks the configured override when present, the hardware address otherwise.
#[derive(Debug, Clone)]
pub enum ConfiguredFingerprint {
    Static(StaticFingerprint),
    Hardware(SysinfoFingerprint),
}

impl ConfiguredFingerprint {
    pub fn from_override(value: Option<&str>) -> Self {
        match value {
            Some(mac) => ConfiguredFingerprint::Static(StaticFingerprint(mac.to_string())),
            None => ConfiguredFingerprint::Hardware(SysinfoFingerprint),
        }
    }
}

impl HostFingerprint for ConfiguredFingerprint {
    fn fingerprint(&self) -> Result<String> {
        match self {
            ConfiguredFingerprint::Static(inner) => inner.fingerprint(),
            ConfiguredFingerprint::Hardware(inner) => inner.fingerprint(),
        }
    }
}
