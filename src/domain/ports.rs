use crate::domain::model::{AppendOutcome, ElementHandle, ProfileRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Browser capability the harvester and the capture flow drive.
///
/// Selectors are opaque to callers; the implementation decides how to resolve them.
/// Lookups that match nothing return `HarvestError::ElementNotFound`.
#[async_trait]
pub trait PageClient: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn find_single(&self, selector: &str) -> Result<ElementHandle>;
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;
    async fn find_within(&self, parent: &ElementHandle, selector: &str) -> Result<ElementHandle>;
    /// Clears the input matched by `selector`, types `text` and submits it.
    async fn submit_text(&self, selector: &str, text: &str) -> Result<()>;
    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<()>;
    async fn click(&self, element: &ElementHandle) -> Result<()>;
    async fn text(&self, element: &ElementHandle) -> Result<String>;
    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;
    async fn current_url(&self) -> Result<String>;
}

/// Opens and closes page-client sessions, one per cycle or search run.
#[async_trait]
pub trait PageSessions: Send + Sync {
    type Page: PageClient;

    async fn open(&self) -> Result<Self::Page>;
    async fn close(&self, page: Self::Page) -> Result<()>;
}

pub trait ProfileSink: Send {
    fn contains_phone(&self, phone: &str) -> Result<bool>;
    fn append(&mut self, record: &ProfileRecord) -> Result<AppendOutcome>;
    fn row_count(&self) -> Result<usize>;
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// `Ok(false)` is a denial; `Err` means the check itself could not start.
    async fn authorize(&self) -> Result<bool>;
}

pub trait HostFingerprint: Send + Sync {
    fn fingerprint(&self) -> Result<String>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
