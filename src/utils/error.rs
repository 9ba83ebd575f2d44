use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Host fingerprint unavailable: {reason}")]
    FingerprintUnavailable { reason: String },

    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Cannot parse last-updated text '{text}': {reason}")]
    UnparseableDate { text: String, reason: String },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("WebDriver error: {message}")]
    WebDriver { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// Coarse classification used to decide how far a failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fingerprint,
    NetworkTransient,
    Parse,
    ElementNotFound,
    Persistence,
    Configuration,
}

impl HarvestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HarvestError::FingerprintUnavailable { .. } => ErrorCategory::Fingerprint,
            HarvestError::Network(_) | HarvestError::HttpStatus { .. } => {
                ErrorCategory::NetworkTransient
            }
            HarvestError::UnparseableDate { .. } | HarvestError::Serialization(_) => {
                ErrorCategory::Parse
            }
            HarvestError::ElementNotFound { .. } | HarvestError::WebDriver { .. } => {
                ErrorCategory::ElementNotFound
            }
            HarvestError::Io(_) | HarvestError::Csv(_) => ErrorCategory::Persistence,
            HarvestError::ConfigError { .. } | HarvestError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// Failures that abort a whole cycle instead of a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Fingerprint | ErrorCategory::Configuration
        )
    }

    pub fn element_not_found(selector: impl Into<String>) -> Self {
        HarvestError::ElementNotFound {
            selector: selector.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
