use crate::domain::model::ElementHandle;
use crate::domain::ports::PageClient;
use crate::utils::error::{HarvestError, Result};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Condition-based wait used instead of fixed sleeps after navigation and clicks.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Poll until `selector` resolves or the timeout elapses.
    pub async fn element<P: PageClient + ?Sized>(
        &self,
        page: &P,
        selector: &str,
    ) -> Result<ElementHandle> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match page.find_single(selector).await {
                Ok(element) => return Ok(element),
                Err(HarvestError::ElementNotFound { .. }) if Instant::now() < deadline => {
                    sleep(self.poll_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Poll until at least one element matches `selector`.
    pub async fn elements<P: PageClient + ?Sized>(
        &self,
        page: &P,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let found = page.find_all(selector).await?;
            if !found.is_empty() {
                return Ok(found);
            }
            if Instant::now() >= deadline {
                return Err(HarvestError::element_not_found(selector));
            }
            sleep(self.poll_interval).await;
        }
    }
}
