use serde::{Deserialize, Serialize};
use std::fmt;

/// Column headers of the tabular sink, in write order.
pub const PROFILE_HEADERS: [&str; 8] = [
    "Name",
    "Phone",
    "Rating",
    "ReviewCount",
    "Address",
    "Category",
    "LastUpdatedText",
    "URL",
];

/// One captured business profile, i.e. one row of the tabular sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(rename = "Name")]
    pub name: String,
    /// Empty when the profile shows no phone; such rows are never deduplicated.
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "ReviewCount")]
    pub review_count: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "LastUpdatedText")]
    pub last_updated_text: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl ProfileRecord {
    pub fn has_phone(&self) -> bool {
        !self.phone.trim().is_empty()
    }
}

/// Opaque reference to an element owned by the page client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptureOutcome {
    Captured,
    SkippedFresh,
    SkippedDuplicate,
    SkippedGoogleOwned,
    SkippedError,
}

impl fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CaptureOutcome::Captured => "captured",
            CaptureOutcome::SkippedFresh => "skipped (fresh)",
            CaptureOutcome::SkippedDuplicate => "skipped (duplicate phone)",
            CaptureOutcome::SkippedGoogleOwned => "skipped (platform-owned)",
            CaptureOutcome::SkippedError => "skipped (error)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    DuplicatePhone,
}

/// Per-outcome counters accumulated over a capture phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub captured: usize,
    pub fresh: usize,
    pub duplicate: usize,
    pub google_owned: usize,
    pub errors: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: CaptureOutcome) {
        match outcome {
            CaptureOutcome::Captured => self.captured += 1,
            CaptureOutcome::SkippedFresh => self.fresh += 1,
            CaptureOutcome::SkippedDuplicate => self.duplicate += 1,
            CaptureOutcome::SkippedGoogleOwned => self.google_owned += 1,
            CaptureOutcome::SkippedError => self.errors += 1,
        }
    }

    pub fn merge(&mut self, other: &OutcomeTally) {
        self.captured += other.captured;
        self.fresh += other.fresh;
        self.duplicate += other.duplicate;
        self.google_owned += other.google_owned;
        self.errors += other.errors;
    }

    pub fn total(&self) -> usize {
        self.captured + self.fresh + self.duplicate + self.google_owned + self.errors
    }
}

/// Scroll iteration cap. The interactive search stops earlier than the scheduled scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    SingleRun,
    ContinuousScan,
}

impl ScrollMode {
    pub fn default_cap(self) -> usize {
        match self {
            ScrollMode::SingleRun => 15,
            ScrollMode::ContinuousScan => 20,
        }
    }
}

/// Summary of one harvest + capture pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub authorized: bool,
    pub terms_processed: usize,
    pub terms_failed: usize,
    pub new_links: usize,
    pub links_visited: usize,
    pub outcomes: OutcomeTally,
}
