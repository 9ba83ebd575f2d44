mod common;

use common::{instant_config, FakePage};
use profile_harvester::{LinkHarvester, LinkStore, ScrollMode};
use std::fs;
use tempfile::TempDir;

const ANCHOR: &str = "a.hfpxzc";

fn harvester(mode: ScrollMode) -> LinkHarvester {
    let config = instant_config();
    LinkHarvester::new(&config.harvest, &config.selectors, mode)
}

#[tokio::test]
async fn test_scroll_stops_at_fixed_point() {
    let page = FakePage::new().with_result_counts(ANCHOR, &[5, 12, 12, 40]);
    let harvester = harvester(ScrollMode::ContinuousScan);

    let links = harvester.collect("restaurante delivery Salvador", &page).await.unwrap();

    // Stabilized at the second measurement; the third confirms it.
    assert_eq!(page.measurement_reads(ANCHOR), 3);
    assert_eq!(page.scrolls(), 2);
    assert_eq!(links.len(), 12);
    assert_eq!(
        page.submissions(),
        vec![("#searchboxinput".to_string(), "restaurante delivery Salvador".to_string())]
    );
}

#[tokio::test]
async fn test_scroll_never_exceeds_cap() {
    let growing: Vec<usize> = (1..=40).collect();

    let page = FakePage::new().with_result_counts(ANCHOR, &growing);
    harvester(ScrollMode::ContinuousScan)
        .collect("hotel", &page)
        .await
        .unwrap();
    assert_eq!(page.measurement_reads(ANCHOR), 20);

    let page = FakePage::new().with_result_counts(ANCHOR, &growing);
    let single = harvester(ScrollMode::SingleRun);
    assert_eq!(single.scroll_cap(), 15);
    single.collect("hotel", &page).await.unwrap();
    assert_eq!(page.measurement_reads(ANCHOR), 15);
}

#[tokio::test]
async fn test_empty_result_list_reads_once_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = LinkStore::new(dir.path().join("links.txt"));
    let page = FakePage::new().with_result_counts(ANCHOR, &[0]);

    let added = harvester(ScrollMode::ContinuousScan)
        .harvest("nada", &page, &store)
        .await
        .unwrap();

    assert_eq!(added, 0);
    assert_eq!(page.measurement_reads(ANCHOR), 1);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_blank_hrefs_are_dropped() {
    let page = FakePage::new()
        .with_attribute("anchor-1", "href", "")
        .with_attribute("anchor-2", "href", "   ")
        .with_result_counts(ANCHOR, &[4, 4]);

    let links = harvester(ScrollMode::ContinuousScan)
        .collect("bar", &page)
        .await
        .unwrap();

    assert_eq!(links.len(), 2);
    assert!(links.contains("https://maps.example/place/0"));
    assert!(links.contains("https://maps.example/place/3"));
}

#[tokio::test]
async fn test_harvest_twice_adds_nothing_the_second_time() {
    let dir = TempDir::new().unwrap();
    let store = LinkStore::new(dir.path().join("links.txt"));
    let harvester = harvester(ScrollMode::ContinuousScan);

    let page = FakePage::new().with_result_counts(ANCHOR, &[3, 3]);
    assert_eq!(harvester.harvest("padaria", &page, &store).await.unwrap(), 3);
    let after_first = fs::read_to_string(store.path()).unwrap();

    let page = FakePage::new().with_result_counts(ANCHOR, &[3, 3]);
    assert_eq!(harvester.harvest("padaria", &page, &store).await.unwrap(), 0);

    assert_eq!(fs::read_to_string(store.path()).unwrap(), after_first);
}

#[tokio::test]
async fn test_persisted_set_only_grows_without_duplicates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.txt");
    fs::write(&path, "https://maps.example/place/1\nhttps://maps.example/legacy\n").unwrap();
    let store = LinkStore::new(&path);
    let before = store.load().unwrap();

    let page = FakePage::new().with_result_counts(ANCHOR, &[3, 3]);
    let added = harvester(ScrollMode::ContinuousScan)
        .harvest("pousada", &page, &store)
        .await
        .unwrap();

    assert_eq!(added, 2);
    let after = store.load().unwrap();
    assert!(after.is_superset(&before));
    assert_eq!(after.len(), 4);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), after.len());
    assert_eq!(
        &lines[2..],
        &["https://maps.example/place/0", "https://maps.example/place/2"]
    );
}
