use crate::adapters::{LinkStore, StatusLog};
use crate::config::HarvesterConfig;
use crate::core::capture::ProfileCapture;
use crate::core::harvest::LinkHarvester;
use crate::domain::model::CycleReport;
use crate::domain::ports::{Authorizer, Clock, PageClient, PageSessions, ProfileSink};
use crate::utils::error::{HarvestError, Result};
use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Gate → harvest every term → capture every stored link → record completion.
pub struct CycleRunner<A: Authorizer, S: ProfileSink, C: Clock> {
    authorizer: A,
    harvester: LinkHarvester,
    capture: ProfileCapture<S, C>,
    config: HarvesterConfig,
}

impl<A: Authorizer, S: ProfileSink, C: Clock> CycleRunner<A, S, C> {
    pub fn new(
        authorizer: A,
        harvester: LinkHarvester,
        capture: ProfileCapture<S, C>,
        config: HarvesterConfig,
    ) -> Self {
        Self {
            authorizer,
            harvester,
            capture,
            config,
        }
    }

    async fn gate(&self, phase: &str) -> Result<bool> {
        tracing::info!("→ Checking license before {}…", phase);
        let allowed = self.authorizer.authorize().await?;
        if !allowed {
            tracing::error!("Client BLOCKED, skipping {}", phase);
        }
        Ok(allowed)
    }

    /// Run one full cycle. Only initialization failures are returned as errors;
    /// failures of single terms or links are logged and counted.
    pub async fn run_cycle<Ss: PageSessions>(&mut self, sessions: &Ss) -> Result<CycleReport> {
        let data_dir = self.config.data_dir.clone();
        if !data_dir.is_dir() {
            return Err(HarvestError::ConfigError {
                message: format!("data directory {} not found", data_dir.display()),
            });
        }

        let mut report = CycleReport::default();

        tracing::info!("===== CYCLE: link harvest =====");
        if !self.gate("link harvest").await? {
            return Ok(report);
        }
        report.authorized = true;

        let page = sessions.open().await?;
        let result = self.run_phases(&page, &mut report).await;
        if let Err(e) = sessions.close(page).await {
            tracing::warn!("Closing browser session failed: {}", e);
        }
        result?;

        if report.authorized {
            let status = StatusLog::new(self.config.status_path());
            if let Err(e) = status.record_completion() {
                tracing::error!("Could not record cycle status: {}", e);
            }
        }

        Ok(report)
    }

    async fn run_phases<P: PageClient>(&mut self, page: &P, report: &mut CycleReport) -> Result<()> {
        self.harvest_terms(page, report).await;

        tracing::info!("===== CYCLE: profile capture =====");
        if !self.gate("profile capture").await? {
            report.authorized = false;
            return Ok(());
        }

        let links = load_capture_links(&self.config.data_dir, &self.config.files.status)?;
        if links.is_empty() {
            tracing::warn!("No links found in the data directory text files");
            return Ok(());
        }

        for url in &links {
            let tally = self.capture.process_link(page, url).await;
            report.outcomes.merge(&tally);
            report.links_visited += 1;
        }

        tracing::info!(
            "🏁 Capture finished: {} links, {} captured, {} fresh, {} duplicate, {} platform-owned, {} errors",
            report.links_visited,
            report.outcomes.captured,
            report.outcomes.fresh,
            report.outcomes.duplicate,
            report.outcomes.google_owned,
            report.outcomes.errors
        );
        Ok(())
    }

    async fn harvest_terms<P: PageClient>(&self, page: &P, report: &mut CycleReport) {
        let keywords = &self.config.keywords;
        tracing::info!("⚙️ Starting collection for {} keywords", keywords.len());

        if let Err(e) = page.navigate(&self.config.browser.start_url).await {
            tracing::error!("Could not open start page: {}", e);
            report.terms_failed += keywords.len();
            return;
        }

        let store = LinkStore::new(self.config.links_path());
        for (index, term) in keywords.iter().enumerate() {
            tracing::info!("=== RUNNING {}/{}: '{}' ===", index + 1, keywords.len(), term);
            match self.harvester.harvest(term, page, &store).await {
                Ok(added) => {
                    report.terms_processed += 1;
                    report.new_links += added;
                }
                Err(e) => {
                    tracing::error!("Harvest failed for '{}': {}", term, e);
                    report.terms_failed += 1;
                }
            }
        }
        tracing::info!("🏁 Link collection finished");
    }

    /// Repeat cycles every `interval` until Ctrl-C. A signal that arrives mid-cycle
    /// lets the cycle finish and stops before the next one.
    pub async fn run_forever<Ss: PageSessions>(&mut self, sessions: &Ss, interval: Duration) {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_until(sessions, interval, ctrl_c).await;
    }

    /// Repeat cycles every `interval` until `shutdown` completes. `shutdown` is only
    /// checked between cycles.
    pub async fn run_until<Ss, F>(&mut self, sessions: &Ss, interval: Duration, shutdown: F)
    where
        Ss: PageSessions,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        // First poll registers the listener before any cycle starts.
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping");
                return;
            }
            _ = std::future::ready(()) => {}
        }

        loop {
            match self.run_cycle(sessions).await {
                Ok(report) => tracing::info!(
                    "Cycle report: authorized={}, new links={}, links visited={}, captured={}",
                    report.authorized,
                    report.new_links,
                    report.links_visited,
                    report.outcomes.captured
                ),
                Err(e) if e.is_fatal() => {
                    tracing::error!("Cycle aborted ({:?}): {}", e.category(), e)
                }
                Err(e) => tracing::warn!("Cycle ended early ({:?}): {}", e.category(), e),
            }

            tracing::info!("===== CYCLE complete. Waiting {:?} =====", interval);
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

/// Every line of every `.txt` file in `data_dir` except the status file, in file-name
/// order, each URL once.
pub fn load_capture_links(data_dir: &Path, status_file: &str) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        let is_text = path.extension().and_then(|ext| ext.to_str()) == Some("txt");
        let is_status = path.file_name().and_then(|name| name.to_str()) == Some(status_file);
        if path.is_file() && is_text && !is_status {
            files.push(path);
        }
    }
    files.sort();

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for file in files {
        let content = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Could not read {}: {}", file.display(), e);
                continue;
            }
        };
        let mut loaded = 0usize;
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            loaded += 1;
            if seen.insert(line.to_string()) {
                links.push(line.to_string());
            }
        }
        tracing::info!("📄 {}: {} links loaded", file.display(), loaded);
    }
    Ok(links)
}
