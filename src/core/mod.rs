pub mod capture;
pub mod cycle;
pub mod harvest;
pub mod license;
pub mod search;
pub mod staleness;
pub mod wait;

pub use crate::domain::model::{CaptureOutcome, CycleReport, OutcomeTally, ProfileRecord};
pub use crate::domain::ports::{
    Authorizer, Clock, HostFingerprint, PageClient, PageSessions, ProfileSink,
};
pub use crate::utils::error::Result;
