use crate::config::{BrowserConfig, CaptureConfig, Selectors};
use crate::core::staleness;
use crate::core::wait::WaitPolicy;
use crate::domain::model::{
    AppendOutcome, CaptureOutcome, ElementHandle, OutcomeTally, ProfileRecord,
};
use crate::domain::ports::{Clock, PageClient, ProfileSink};
use crate::utils::error::{HarvestError, Result};
use std::time::Duration;
use tokio::time::sleep;

/// Re-visits harvested links and captures profiles whose last update is stale.
pub struct ProfileCapture<S: ProfileSink, C: Clock> {
    sink: S,
    clock: C,
    selectors: Selectors,
    config: CaptureConfig,
    wait: WaitPolicy,
    click_settle: Duration,
}

impl<S: ProfileSink, C: Clock> ProfileCapture<S, C> {
    pub fn new(
        sink: S,
        clock: C,
        selectors: Selectors,
        config: CaptureConfig,
        browser: &BrowserConfig,
    ) -> Self {
        Self {
            sink,
            clock,
            selectors,
            config,
            wait: WaitPolicy::new(browser.wait_timeout(), browser.poll_interval()),
            click_settle: browser.click_settle(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Open `url` and process every profile container on it.
    #[tracing::instrument(name = "profile_link", skip_all, fields(url = %url))]
    pub async fn process_link<P: PageClient + ?Sized>(&mut self, page: &P, url: &str) -> OutcomeTally {
        let mut tally = OutcomeTally::default();

        tracing::info!("🔗 Opening {}", url);
        if let Err(e) = page.navigate(url).await {
            tracing::error!("Navigation failed: {}", e);
            tally.record(CaptureOutcome::SkippedError);
            return tally;
        }

        match self
            .wait
            .elements(page, &self.selectors.profile_container)
            .await
        {
            Ok(containers) => {
                tracing::info!("🔍 Found {} containers", containers.len());
                for container in &containers {
                    let outcome = match self.open_container(page, container).await {
                        Ok(()) => self.process_profile(page).await,
                        Err(e) => {
                            tracing::warn!("Could not open container: {}", e);
                            CaptureOutcome::SkippedError
                        }
                    };
                    tally.record(outcome);
                }
            }
            Err(HarvestError::ElementNotFound { .. }) => {
                tracing::debug!("No profile containers, treating page as a single profile");
                tally.record(self.process_profile(page).await);
            }
            Err(e) => {
                tracing::error!("Container lookup failed: {}", e);
                tally.record(CaptureOutcome::SkippedError);
            }
        }

        tally
    }

    async fn open_container<P: PageClient + ?Sized>(
        &self,
        page: &P,
        container: &ElementHandle,
    ) -> Result<()> {
        let image = page
            .find_within(container, &self.selectors.container_image)
            .await?;
        page.scroll_into_view(&image).await?;
        page.click(&image).await?;
        sleep(self.click_settle).await;
        Ok(())
    }

    /// Classify the profile currently open and capture it when stale.
    pub async fn process_profile<P: PageClient + ?Sized>(&mut self, page: &P) -> CaptureOutcome {
        match self.try_process_profile(page).await {
            Ok(outcome) => {
                tracing::debug!("Profile {}", outcome);
                outcome
            }
            Err(e) => {
                tracing::error!("Profile processing failed ({:?}): {}", e.category(), e);
                CaptureOutcome::SkippedError
            }
        }
    }

    async fn try_process_profile<P: PageClient + ?Sized>(
        &mut self,
        page: &P,
    ) -> Result<CaptureOutcome> {
        let marker = self.wait.element(page, &self.selectors.last_updated).await?;
        let updated_text = page.text(&marker).await?.trim().to_string();
        let url = page.current_url().await?;

        match staleness::is_stale(&updated_text, self.clock.today()) {
            Ok(false) => {
                tracing::info!("✅ Profile updated within the last 3 months");
                return Ok(CaptureOutcome::SkippedFresh);
            }
            Ok(true) => {
                tracing::warn!("⚠️ Profile outdated for more than 3 months, capturing");
            }
            Err(e) => {
                tracing::warn!("{}", e);
                if self.is_platform_owned(page).await {
                    tracing::info!("Profile created by the platform, skipping");
                    return Ok(CaptureOutcome::SkippedGoogleOwned);
                }
                if !self.config.capture_unparseable {
                    tracing::warn!("Unparseable profile left uncaptured by configuration");
                    return Ok(CaptureOutcome::SkippedError);
                }
            }
        }

        let record = self.extract(page, updated_text, url).await?;
        match self.sink.append(&record)? {
            AppendOutcome::Appended => Ok(CaptureOutcome::Captured),
            AppendOutcome::DuplicatePhone => Ok(CaptureOutcome::SkippedDuplicate),
        }
    }

    async fn is_platform_owned<P: PageClient + ?Sized>(&self, page: &P) -> bool {
        let marker = match page.find_single(&self.selectors.platform_marker).await {
            Ok(marker) => marker,
            Err(HarvestError::ElementNotFound { .. }) => return false,
            Err(e) => {
                tracing::warn!("Platform marker lookup failed: {}", e);
                return false;
            }
        };
        match page.text(&marker).await {
            Ok(text) => text.contains(&self.config.platform_marker_phrase),
            Err(e) => {
                tracing::debug!("Platform marker unreadable: {}", e);
                false
            }
        }
    }

    async fn text_of<P: PageClient + ?Sized>(&self, page: &P, selector: &str) -> Result<String> {
        let element = page.find_single(selector).await?;
        Ok(page.text(&element).await?.trim().to_string())
    }

    async fn phone<P: PageClient + ?Sized>(&self, page: &P) -> Result<String> {
        let button = match self.wait.element(page, &self.selectors.phone_button).await {
            Ok(button) => button,
            Err(HarvestError::ElementNotFound { .. }) => return Ok(String::new()),
            Err(e) => return Err(e),
        };
        match page.find_within(&button, &self.selectors.phone_value).await {
            Ok(value) => Ok(page.text(&value).await?.trim().to_string()),
            Err(HarvestError::ElementNotFound { .. }) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    async fn extract<P: PageClient + ?Sized>(
        &self,
        page: &P,
        last_updated_text: String,
        url: String,
    ) -> Result<ProfileRecord> {
        let details = page.find_single(&self.selectors.details_toggle).await?;
        page.click(&details).await?;

        let phone = self.phone(page).await?;
        let rating = self.text_of(page, &self.selectors.rating).await?;

        let reviews = self.wait.element(page, &self.selectors.review_count).await?;
        let review_count = page.text(&reviews).await?.trim().to_string();

        let heading = self.wait.element(page, &self.selectors.name).await?;
        let heading_text = page.text(&heading).await?;
        let name = match heading_text.split_once('–') {
            Some((name, _)) => name.trim().to_string(),
            None => heading_text.trim().to_string(),
        };

        let mut categories = Vec::new();
        for button in page.find_all(&self.selectors.category).await? {
            let label = page.text(&button).await?;
            if !label.trim().is_empty() {
                categories.push(label.trim().to_string());
            }
        }

        let address = self.text_of(page, &self.selectors.address).await?;

        Ok(ProfileRecord {
            name,
            phone,
            rating,
            review_count,
            address,
            category: categories.join(", "),
            last_updated_text,
            url,
        })
    }
}
