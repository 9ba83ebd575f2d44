pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{CsvProfileSink, LinkStore, WebDriverClient, WebDriverSessions};
pub use crate::config::HarvesterConfig;
pub use crate::core::{
    capture::ProfileCapture, cycle::CycleRunner, harvest::LinkHarvester, license::LicenseGate,
};
pub use crate::domain::model::{CaptureOutcome, CycleReport, ProfileRecord, ScrollMode};
pub use crate::utils::error::{HarvestError, Result};
