#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::{CliArgs, Command};

use crate::domain::model::ScrollMode;
use crate::utils::error::{HarvestError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    pub data_dir: PathBuf,
    pub keywords: Vec<String>,
    pub license: LicenseConfig,
    pub browser: BrowserConfig,
    pub harvest: HarvestConfig,
    pub capture: CaptureConfig,
    pub selectors: Selectors,
    pub schedule: ScheduleConfig,
    pub files: FileNames,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub endpoint: String,
    pub ip_service: String,
    pub attempts: u32,
    pub retry_delay_seconds: u64,
    pub auth_timeout_seconds: u64,
    pub ip_timeout_seconds: u64,
    /// Overrides the hardware fingerprint when set.
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub start_url: String,
    pub wait_timeout_seconds: u64,
    pub poll_interval_millis: u64,
    pub click_settle_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Explicit scroll cap; falls back to the cap of the active `ScrollMode`.
    pub scroll_cap: Option<usize>,
    pub scroll_settle_millis: u64,
    pub submit_settle_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub platform_marker_phrase: String,
    /// Capture profiles whose last-updated text cannot be parsed (unless platform-owned).
    pub capture_unparseable: bool,
}

/// Element selectors handed to the page client. `xpath:` prefixed values are XPath,
/// everything else is CSS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub search_box: String,
    pub result_anchor: String,
    pub profile_container: String,
    pub container_image: String,
    pub last_updated: String,
    pub platform_marker: String,
    pub details_toggle: String,
    pub phone_button: String,
    pub phone_value: String,
    pub rating: String,
    pub review_count: String,
    pub name: String,
    pub category: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub links: String,
    pub profiles: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("dados"),
            keywords: vec![
                "restaurante delivery Salvador".to_string(),
                "hotel praia Grande".to_string(),
            ],
            license: LicenseConfig::default(),
            browser: BrowserConfig::default(),
            harvest: HarvestConfig::default(),
            capture: CaptureConfig::default(),
            selectors: Selectors::default(),
            schedule: ScheduleConfig::default(),
            files: FileNames::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://painel-api-k2v2.onrender.com/command".to_string(),
            ip_service: "https://api.ipify.org".to_string(),
            attempts: 3,
            retry_delay_seconds: 2,
            auth_timeout_seconds: 10,
            ip_timeout_seconds: 5,
            fingerprint: None,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            start_url: "https://www.google.com/maps/@-16.4932735,-39.3111171,12z?hl=pt-BR"
                .to_string(),
            wait_timeout_seconds: 10,
            poll_interval_millis: 250,
            click_settle_millis: 1000,
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            scroll_cap: None,
            scroll_settle_millis: 2000,
            submit_settle_millis: 5000,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            platform_marker_phrase: "Google Street View".to_string(),
            capture_unparseable: true,
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            search_box: "#searchboxinput".to_string(),
            result_anchor: "a.hfpxzc".to_string(),
            profile_container: ".ofKBgf".to_string(),
            container_image: ".DaSXdd".to_string(),
            last_updated:
                "xpath://div[contains(@class, 'lchoPb') or contains(@class, 'mqX5ad')]"
                    .to_string(),
            platform_marker: ".ilzTS".to_string(),
            details_toggle: ".fKm1Mb".to_string(),
            phone_button:
                "xpath://button[@class='CsEnBe' and contains(@aria-label, 'Telefone:')]"
                    .to_string(),
            phone_value: ".Io6YTe".to_string(),
            rating: "div.fontDisplayLarge".to_string(),
            review_count: "xpath://span[contains(text(), 'avaliações')]".to_string(),
            name: "h1".to_string(),
            category: "button.DkEaL".to_string(),
            address: "div.Io6YTe".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
        }
    }
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            links: "links.txt".to_string(),
            profiles: "profiles.csv".to_string(),
            status: "status.txt".to_string(),
        }
    }
}

impl LicenseConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_seconds)
    }

    pub fn ip_timeout(&self) -> Duration {
        Duration::from_secs(self.ip_timeout_seconds)
    }
}

impl BrowserConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_millis)
    }
}

impl HarvestConfig {
    pub fn cap_for(&self, mode: ScrollMode) -> usize {
        self.scroll_cap.unwrap_or_else(|| mode.default_cap())
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_millis)
    }

    pub fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle_millis)
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl HarvesterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, expanding `${VAR}` references first
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HarvestError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HarvestError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        // Unknown variables are left untouched so validation can point at them.
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Apply `DATA_DIR`, `KEYWORDS` and `PAINEL_URL` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("DATA_DIR").filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("KEYWORDS").filter(|v| !v.trim().is_empty()) {
            self.keywords = parse_keywords(&raw);
        }
        if let Some(endpoint) = lookup("PAINEL_URL").filter(|v| !v.trim().is_empty()) {
            self.license.endpoint = endpoint;
        }
    }

    pub fn links_path(&self) -> PathBuf {
        self.data_dir.join(&self.files.links)
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join(&self.files.profiles)
    }

    pub fn status_path(&self) -> PathBuf {
        self.data_dir.join(&self.files.status)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir.to_string_lossy())?;
        validation::validate_url("license.endpoint", &self.license.endpoint)?;
        validation::validate_url("license.ip_service", &self.license.ip_service)?;
        validation::validate_positive_number(
            "license.attempts",
            self.license.attempts as usize,
            1,
        )?;
        validation::validate_url("browser.webdriver_url", &self.browser.webdriver_url)?;
        validation::validate_url("browser.start_url", &self.browser.start_url)?;

        if let Some(cap) = self.harvest.scroll_cap {
            validation::validate_positive_number("harvest.scroll_cap", cap, 1)?;
        }

        validation::validate_non_empty_string(
            "capture.platform_marker_phrase",
            &self.capture.platform_marker_phrase,
        )?;

        validation::validate_file_name("files.links", &self.files.links)?;
        validation::validate_file_name("files.profiles", &self.files.profiles)?;
        validation::validate_file_name("files.status", &self.files.status)?;
        if !self.files.links.ends_with(".txt") {
            return Err(HarvestError::InvalidConfigValueError {
                field: "files.links".to_string(),
                value: self.files.links.clone(),
                reason: "Link list must be a .txt file".to_string(),
            });
        }

        for (index, keyword) in self.keywords.iter().enumerate() {
            validation::validate_non_empty_string(&format!("keywords[{}]", index), keyword)?;
        }

        Ok(())
    }
}

impl Validate for HarvesterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Split a `;`-separated keyword list, dropping blank entries.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_deployment() {
        let config = HarvesterConfig::default();

        assert_eq!(config.license.attempts, 3);
        assert_eq!(config.license.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.license.auth_timeout(), Duration::from_secs(10));
        assert_eq!(config.license.ip_timeout(), Duration::from_secs(5));
        assert_eq!(config.schedule.interval(), Duration::from_secs(3600));
        assert_eq!(config.harvest.cap_for(ScrollMode::SingleRun), 15);
        assert_eq!(config.harvest.cap_for(ScrollMode::ContinuousScan), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
data_dir = "/mnt/dados"
keywords = ["pizzaria Ilhéus"]

[license]
endpoint = "https://license.example.com/command"
attempts = 5

[harvest]
scroll_cap = 8
"#;

        let config = HarvesterConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/mnt/dados"));
        assert_eq!(config.keywords, vec!["pizzaria Ilhéus".to_string()]);
        assert_eq!(config.license.attempts, 5);
        assert_eq!(config.license.retry_delay_seconds, 2);
        assert_eq!(config.harvest.cap_for(ScrollMode::ContinuousScan), 8);
        assert_eq!(config.selectors.result_anchor, "a.hfpxzc");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PROFILE_HARVESTER_TEST_ENDPOINT", "https://test.license.com");

        let toml_content = r#"
[license]
endpoint = "${PROFILE_HARVESTER_TEST_ENDPOINT}/command"
"#;

        let config = HarvesterConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.license.endpoint, "https://test.license.com/command");

        std::env::remove_var("PROFILE_HARVESTER_TEST_ENDPOINT");
    }

    #[test]
    fn test_unresolved_variable_fails_validation() {
        let toml_content = r#"
[license]
endpoint = "${PROFILE_HARVESTER_UNSET_VARIABLE}"
"#;

        let config = HarvesterConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_from_environment() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATA_DIR", "/tmp/harvest"),
            ("KEYWORDS", "bar Itacaré; ;pousada Olivença"),
            ("PAINEL_URL", "https://panel.example.com/command"),
        ]);

        let mut config = HarvesterConfig::default();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/harvest"));
        assert_eq!(config.keywords, vec!["bar Itacaré", "pousada Olivença"]);
        assert_eq!(config.license.endpoint, "https://panel.example.com/command");
        assert_eq!(config.links_path(), PathBuf::from("/tmp/harvest/links.txt"));
    }

    #[test]
    fn test_link_file_must_be_text() {
        let mut config = HarvesterConfig::default();
        config.files.links = "links.csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"keywords = [\"oficina Ilheus\"]\n[schedule]\ninterval_seconds = 60\n")
            .unwrap();

        let config = HarvesterConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.schedule.interval(), Duration::from_secs(60));
        assert_eq!(config.keywords.len(), 1);
    }
}
