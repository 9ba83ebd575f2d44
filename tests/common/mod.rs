#![allow(dead_code)]

use async_trait::async_trait;
use profile_harvester::config::{BrowserConfig, HarvestConfig, HarvesterConfig, Selectors};
use profile_harvester::core::{Authorizer, PageClient, PageSessions};
use profile_harvester::domain::model::ElementHandle;
use profile_harvester::{HarvestError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct PageState {
    elements: HashMap<String, Vec<String>>,
    children: HashMap<(String, String), String>,
    texts: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    failing: HashSet<String>,
    scripted_counts: HashMap<String, Vec<usize>>,
    measurement_reads: HashMap<String, usize>,
    current_url: String,
    navigations: Vec<String>,
    submissions: Vec<(String, String)>,
    clicks: Vec<String>,
    scrolls: usize,
}

/// Scripted in-memory page client. Clones share state.
#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn with_element(self, selector: &str, id: &str, text: &str) -> Self {
        self.with_state(|s| {
            s.elements
                .entry(selector.to_string())
                .or_default()
                .push(id.to_string());
            s.texts.insert(id.to_string(), text.to_string());
        });
        self
    }

    pub fn with_child(self, parent: &str, selector: &str, id: &str, text: &str) -> Self {
        self.with_state(|s| {
            s.children
                .insert((parent.to_string(), selector.to_string()), id.to_string());
            s.texts.insert(id.to_string(), text.to_string());
        });
        self
    }

    pub fn with_attribute(self, id: &str, name: &str, value: &str) -> Self {
        self.with_state(|s| {
            s.attributes
                .insert((id.to_string(), name.to_string()), value.to_string());
        });
        self
    }

    /// Successive `find_all(selector)` calls return these many anchors (last value repeats).
    /// Anchor `i` is `anchor-i` with href `https://maps.example/place/i`.
    pub fn with_result_counts(self, selector: &str, counts: &[usize]) -> Self {
        self.with_state(|s| {
            s.scripted_counts
                .insert(selector.to_string(), counts.to_vec());
            let max = counts.iter().copied().max().unwrap_or(0);
            for i in 0..max {
                s.attributes
                    .entry((format!("anchor-{}", i), "href".to_string()))
                    .or_insert_with(|| format!("https://maps.example/place/{}", i));
            }
        });
        self
    }

    pub fn failing(self, selector: &str) -> Self {
        self.with_state(|s| {
            s.failing.insert(selector.to_string());
        });
        self
    }

    pub fn measurement_reads(&self, selector: &str) -> usize {
        self.with_state(|s| s.measurement_reads.get(selector).copied().unwrap_or(0))
    }

    pub fn navigations(&self) -> Vec<String> {
        self.with_state(|s| s.navigations.clone())
    }

    pub fn submissions(&self) -> Vec<(String, String)> {
        self.with_state(|s| s.submissions.clone())
    }

    pub fn clicks(&self) -> Vec<String> {
        self.with_state(|s| s.clicks.clone())
    }

    pub fn scrolls(&self) -> usize {
        self.with_state(|s| s.scrolls)
    }

    fn check_failing(&self, selector: &str) -> Result<()> {
        if self.with_state(|s| s.failing.contains(selector)) {
            return Err(HarvestError::WebDriver {
                message: format!("scripted failure for {}", selector),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PageClient for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.check_failing(url)?;
        self.with_state(|s| {
            s.navigations.push(url.to_string());
            s.current_url = url.to_string();
        });
        Ok(())
    }

    async fn find_single(&self, selector: &str) -> Result<ElementHandle> {
        self.check_failing(selector)?;
        self.with_state(|s| {
            s.elements
                .get(selector)
                .and_then(|ids| ids.first())
                .map(|id| ElementHandle::new(id.clone()))
        })
        .ok_or_else(|| HarvestError::element_not_found(selector))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.check_failing(selector)?;
        Ok(self.with_state(|s| {
            if let Some(counts) = s.scripted_counts.get(selector) {
                let reads = s.measurement_reads.entry(selector.to_string()).or_insert(0);
                let index = (*reads).min(counts.len().saturating_sub(1));
                *reads += 1;
                let count = counts.get(index).copied().unwrap_or(0);
                return (0..count)
                    .map(|i| ElementHandle::new(format!("anchor-{}", i)))
                    .collect();
            }
            s.elements
                .get(selector)
                .map(|ids| ids.iter().map(|id| ElementHandle::new(id.clone())).collect())
                .unwrap_or_default()
        }))
    }

    async fn find_within(&self, parent: &ElementHandle, selector: &str) -> Result<ElementHandle> {
        self.check_failing(selector)?;
        self.with_state(|s| {
            s.children
                .get(&(parent.id().to_string(), selector.to_string()))
                .map(|id| ElementHandle::new(id.clone()))
        })
        .ok_or_else(|| HarvestError::element_not_found(selector))
    }

    async fn submit_text(&self, selector: &str, text: &str) -> Result<()> {
        self.check_failing(selector)?;
        self.with_state(|s| {
            s.submissions.push((selector.to_string(), text.to_string()));
        });
        Ok(())
    }

    async fn scroll_into_view(&self, _element: &ElementHandle) -> Result<()> {
        self.with_state(|s| s.scrolls += 1);
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.with_state(|s| s.clicks.push(element.id().to_string()));
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        Ok(self.with_state(|s| s.texts.get(element.id()).cloned().unwrap_or_default()))
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.with_state(|s| {
            s.attributes
                .get(&(element.id().to_string(), name.to_string()))
                .cloned()
        }))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.with_state(|s| s.current_url.clone()))
    }
}

/// Hands out clones of one `FakePage` and counts opened sessions.
pub struct FakeSessions {
    pub page: FakePage,
    opened: AtomicUsize,
}

impl FakeSessions {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            opened: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSessions for FakeSessions {
    type Page = FakePage;

    async fn open(&self) -> Result<FakePage> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(self.page.clone())
    }

    async fn close(&self, _page: FakePage) -> Result<()> {
        Ok(())
    }
}

/// Authorizer returning scripted answers in order (last one repeats).
pub struct ScriptedAuthorizer {
    answers: Vec<bool>,
    calls: AtomicUsize,
}

impl ScriptedAuthorizer {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authorizer for ScriptedAuthorizer {
    async fn authorize(&self) -> Result<bool> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.answers.len().saturating_sub(1));
        Ok(self.answers.get(index).copied().unwrap_or(false))
    }
}

/// Config with every wait and settle delay set to zero.
pub fn instant_config() -> HarvesterConfig {
    let mut config = HarvesterConfig::default();
    config.harvest = HarvestConfig {
        scroll_cap: None,
        scroll_settle_millis: 0,
        submit_settle_millis: 0,
    };
    config.browser = BrowserConfig {
        wait_timeout_seconds: 0,
        poll_interval_millis: 0,
        click_settle_millis: 0,
        ..BrowserConfig::default()
    };
    config
}

/// Adds a fully populated profile view to `page`.
pub fn with_profile(page: FakePage, selectors: &Selectors, updated_text: &str, phone: &str) -> FakePage {
    page.with_element(&selectors.last_updated, "updated", updated_text)
        .with_element(&selectors.details_toggle, "details", "")
        .with_element(&selectors.phone_button, "phone-button", "")
        .with_child("phone-button", &selectors.phone_value, "phone-value", phone)
        .with_element(&selectors.rating, "rating", "4,5")
        .with_element(&selectors.review_count, "reviews", "(312 avaliações)")
        .with_element(&selectors.name, "heading", "Pizzaria Bella Napoli – Ilhéus")
        .with_element(&selectors.category, "cat-1", "Pizzaria")
        .with_element(&selectors.category, "cat-2", " ")
        .with_element(&selectors.category, "cat-3", "Restaurante")
        .with_element(&selectors.address, "address", "R. Marquês de Paranaguá, 120 - Centro")
}
