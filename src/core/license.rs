use crate::config::LicenseConfig;
use crate::domain::ports::{Authorizer, HostFingerprint};
use crate::utils::error::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    #[serde(default)]
    ativo: Option<bool>,
}

/// Outcome of one gate check. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseDecision {
    pub allowed: bool,
    pub attempts: u32,
}

/// Remote licensing gate: fingerprint + public IP checked against the panel endpoint.
pub struct LicenseGate<F: HostFingerprint> {
    client: Client,
    fingerprint: F,
    config: LicenseConfig,
}

impl<F: HostFingerprint> LicenseGate<F> {
    pub fn new(fingerprint: F, config: LicenseConfig) -> Self {
        Self {
            client: Client::new(),
            fingerprint,
            config,
        }
    }

    /// Run the gate, reporting how many attempts were made.
    pub async fn check(&self) -> Result<LicenseDecision> {
        let mac = self.fingerprint.fingerprint()?;
        let attempts = self.config.attempts.max(1);

        for attempt in 1..=attempts {
            match self.check_once(&mac).await {
                Ok(allowed) => {
                    if allowed {
                        tracing::info!("🔓 License active for {}", mac);
                    } else {
                        tracing::warn!("🔒 License inactive for {}", mac);
                    }
                    return Ok(LicenseDecision {
                        allowed,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    tracing::error!("License check attempt {}/{} failed: {}", attempt, attempts, e);
                    if attempt < attempts {
                        sleep(self.config.retry_delay()).await;
                    }
                }
            }
        }

        tracing::error!("❌ License check exhausted {} attempts, denying", attempts);
        Ok(LicenseDecision {
            allowed: false,
            attempts,
        })
    }

    async fn check_once(&self, mac: &str) -> Result<bool> {
        let public_ip = self.public_ip().await?;

        tracing::debug!("Querying license endpoint: {}", self.config.endpoint);
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("mac", mac), ("public_ip", public_ip.as_str())])
            .timeout(self.config.auth_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: self.config.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body: LicenseResponse = response.json().await?;
        Ok(body.ativo.unwrap_or(false))
    }

    async fn public_ip(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.config.ip_service)
            .timeout(self.config.ip_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: self.config.ip_service.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?.trim().to_string())
    }
}

#[async_trait]
impl<F: HostFingerprint> Authorizer for LicenseGate<F> {
    async fn authorize(&self) -> Result<bool> {
        Ok(self.check().await?.allowed)
    }
}
