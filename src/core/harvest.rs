use crate::adapters::LinkStore;
use crate::config::{HarvestConfig, Selectors};
use crate::domain::model::ScrollMode;
use crate::domain::ports::PageClient;
use crate::utils::error::Result;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::sleep;

/// Collects profile links for search terms by scrolling the result list to a fixed point.
pub struct LinkHarvester {
    result_anchor: String,
    search_box: String,
    scroll_cap: usize,
    scroll_settle: Duration,
    submit_settle: Duration,
}

impl LinkHarvester {
    pub fn new(config: &HarvestConfig, selectors: &Selectors, mode: ScrollMode) -> Self {
        Self {
            result_anchor: selectors.result_anchor.clone(),
            search_box: selectors.search_box.clone(),
            scroll_cap: config.cap_for(mode),
            scroll_settle: config.scroll_settle(),
            submit_settle: config.submit_settle(),
        }
    }

    pub fn scroll_cap(&self) -> usize {
        self.scroll_cap
    }

    /// Search `term` and merge the discovered links into `store`. Returns the number added.
    #[tracing::instrument(name = "harvest", skip_all, fields(term = %term))]
    pub async fn harvest<P: PageClient + ?Sized>(
        &self,
        term: &str,
        page: &P,
        store: &LinkStore,
    ) -> Result<usize> {
        let links = self.collect(term, page).await?;
        tracing::info!("Collected {} links", links.len());
        store.merge(links)
    }

    /// Search `term` and return every non-empty result link, without persisting.
    pub async fn collect<P: PageClient + ?Sized>(
        &self,
        term: &str,
        page: &P,
    ) -> Result<BTreeSet<String>> {
        tracing::info!("🔍 Searching: {}", term);
        page.submit_text(&self.search_box, term).await?;
        sleep(self.submit_settle).await;

        let mut previous = 0usize;
        let mut anchors = Vec::new();
        for iteration in 1..=self.scroll_cap {
            anchors = page.find_all(&self.result_anchor).await?;
            let current = anchors.len();
            tracing::info!("  ▶️ Scroll {}: {} profiles loaded", iteration, current);
            if current == previous {
                break;
            }
            previous = current;

            if let Some(last) = anchors.last() {
                page.scroll_into_view(last).await?;
            }
            sleep(self.scroll_settle).await;
        }

        let mut links = BTreeSet::new();
        for anchor in &anchors {
            match page.attribute(anchor, "href").await {
                Ok(Some(href)) if !href.trim().is_empty() => {
                    links.insert(href.trim().to_string());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping result anchor without readable href: {}", e),
            }
        }
        Ok(links)
    }
}
