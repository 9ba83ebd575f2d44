use crate::adapters::LinkStore;
use crate::core::harvest::LinkHarvester;
use crate::domain::ports::{Authorizer, PageClient, PageSessions};
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// One interactive search: gate, harvest every term, merge into the link store and
/// return everything collected. `None` when the license gate denies.
pub async fn run_search<A, Ss>(
    authorizer: &A,
    sessions: &Ss,
    harvester: &LinkHarvester,
    start_url: &str,
    store: &LinkStore,
    terms: &[String],
) -> Result<Option<BTreeSet<String>>>
where
    A: Authorizer,
    Ss: PageSessions,
{
    if !authorizer.authorize().await? {
        tracing::error!("Client BLOCKED, search aborted");
        return Ok(None);
    }

    let page = sessions.open().await?;
    let collected = collect_terms(&page, harvester, start_url, terms).await;
    if let Err(e) = sessions.close(page).await {
        tracing::warn!("Closing browser session failed: {}", e);
    }
    let collected = collected?;

    store.merge(collected.iter().cloned())?;
    Ok(Some(collected))
}

async fn collect_terms<P: PageClient>(
    page: &P,
    harvester: &LinkHarvester,
    start_url: &str,
    terms: &[String],
) -> Result<BTreeSet<String>> {
    page.navigate(start_url).await?;

    let mut collected = BTreeSet::new();
    for term in terms {
        match harvester.collect(term, page).await {
            Ok(links) => collected.extend(links),
            Err(e) => tracing::error!("Search failed for '{}': {}", term, e),
        }
    }
    Ok(collected)
}
