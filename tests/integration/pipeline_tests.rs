//! End-to-end harvest tests over a scripted browser session

use gleaner::config::ReportFormat;
use gleaner::crawler::{HarvestObserver, Harvester};
use gleaner::extract::Record;
use gleaner::output::{write_report, Report, RunMetadata};
use gleaner::state::{RunState, SkipReason, SkippedItem, StopReason};
use gleaner::testing::{create_test_config, place_page, place_url, ScriptedSession, SEARCH_URL};
use gleaner::{ConfigError, GleanError};
use std::sync::{Arc, Mutex};

fn names(records: &gleaner::Catalog) -> Vec<String> {
    records.iter().map(|r| r.name().to_string()).collect()
}

/// Serves `count` detail pages that all share the same rating and review count
fn uniform_pages(mut session: ScriptedSession, count: usize) -> ScriptedSession {
    for i in 0..count {
        session = session.page(place_url(i), place_page(&format!("Place {}", i), Some("4.2"), "100"));
    }
    session
}

#[tokio::test]
async fn test_flat_feed_stops_with_available_candidates() {
    let mut session = uniform_pages(ScriptedSession::new(vec![5]), 5);

    let mut harvester = Harvester::new(create_test_config(60, 5)).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    assert_eq!(harvest.stop_reason, StopReason::Stalled);
    assert_eq!(harvest.iterations, 6);
    assert_eq!(harvest.candidates_found, 5);
    assert_eq!(harvest.catalog.len(), 5);
    assert!(harvest.is_partial());

    assert_eq!(session.scrolls(), 5);
    assert_eq!(session.closes(), 1);
}

#[tokio::test]
async fn test_growing_feed_truncates_to_target() {
    let mut session = uniform_pages(ScriptedSession::new(vec![4, 8, 12]), 12);

    let mut harvester = Harvester::new(create_test_config(6, 5)).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    assert_eq!(harvest.stop_reason, StopReason::TargetReached);
    assert_eq!(harvest.candidates_found, 6);
    assert_eq!(
        names(&harvest.catalog),
        (0..6).map(|i| format!("Place {}", i)).collect::<Vec<_>>()
    );

    // Search page first, then detail pages in discovery order
    assert_eq!(session.navigations()[0], SEARCH_URL);
    assert_eq!(
        session.navigations()[1..].to_vec(),
        (0..6).map(place_url).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_one_failed_item_does_not_affect_the_rest() {
    // Item 4 never shows its name
    let mut session = uniform_pages(ScriptedSession::new(vec![10]), 10)
        .page(place_url(3), "<html><body><p>Temporarily unavailable</p></body></html>");

    let mut harvester = Harvester::new(create_test_config(10, 5)).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    assert_eq!(harvest.catalog.len(), 9);
    let expected: Vec<String> = [0, 1, 2, 4, 5, 6, 7, 8, 9]
        .iter()
        .map(|i| format!("Place {}", i))
        .collect();
    assert_eq!(names(&harvest.catalog), expected);

    assert_eq!(harvest.skipped.len(), 1);
    assert_eq!(harvest.skipped[0].position, 4);
    assert_eq!(harvest.skipped[0].reason, SkipReason::IdentityTimeout);
    assert_eq!(harvest.skipped[0].candidate.as_str(), place_url(3));
}

#[tokio::test]
async fn test_navigation_timeout_is_skipped() {
    let mut session = uniform_pages(ScriptedSession::new(vec![3]), 3).timing_out(place_url(1));

    let mut harvester = Harvester::new(create_test_config(3, 5)).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    assert_eq!(names(&harvest.catalog), vec!["Place 0", "Place 2"]);
    assert_eq!(harvest.skipped[0].reason, SkipReason::NavigationTimeout);
}

#[tokio::test]
async fn test_ranking_of_partial_records() {
    let mut session = ScriptedSession::new(vec![4])
        .page(place_url(0), place_page("No Rating", None, "5000"))
        .page(place_url(1), place_page("Hundred", Some("4.5"), "100"))
        .page(place_url(2), place_page("Nine Hundred", Some("4,5"), "900"))
        .page(place_url(3), place_page("Top", Some("4.9"), "no"));

    let mut harvester = Harvester::new(create_test_config(4, 5)).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    assert_eq!(
        names(&harvest.catalog),
        vec!["Top", "Nine Hundred", "Hundred", "No Rating"]
    );

    let records = harvest.catalog.records();
    assert_eq!(records[0].review_count(), 0);
    assert_eq!(records[3].rating(), None);
}

#[tokio::test]
async fn test_setup_failure_releases_session() {
    let mut session = ScriptedSession::new(vec![0]).page(
        SEARCH_URL,
        "<html><body><form>Before you continue</form></body></html>",
    );

    let mut harvester = Harvester::new(create_test_config(10, 5)).unwrap();
    let result = harvester.run(&mut session).await;

    assert!(matches!(result, Err(GleanError::Setup { .. })));
    assert_eq!(session.closes(), 1);
    assert_eq!(session.navigations(), [SEARCH_URL.to_string()]);
}

#[tokio::test]
async fn test_empty_feed_yields_empty_harvest() {
    // The feed container renders but never fills
    let mut session = ScriptedSession::new(vec![0]);

    let mut harvester = Harvester::new(create_test_config(10, 2)).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    assert!(harvest.catalog.is_empty());
    assert_eq!(harvest.candidates_found, 0);
    assert_eq!(harvest.stop_reason, StopReason::Stalled);
    assert_eq!(session.closes(), 1);
}

#[test]
fn test_invalid_selector_rejected_before_any_browser_command() {
    let session = ScriptedSession::new(vec![3]);
    let mut config = create_test_config(3, 5);
    config.selectors.feed = "div[[".to_string();

    let result = Harvester::new(config);

    assert!(matches!(result, Err(ConfigError::InvalidSelector { ref field, .. }) if field == "feed"));
    assert!(session.navigations().is_empty());
    assert_eq!(session.closes(), 0);
}

#[tokio::test]
async fn test_session_failure_mid_run_still_closes() {
    let mut session = ScriptedSession::new(vec![4]).failing_documents();

    let mut harvester = Harvester::new(create_test_config(4, 5)).unwrap();
    let result = harvester.run(&mut session).await;

    assert!(matches!(result, Err(GleanError::Session(_))));
    assert_eq!(session.closes(), 1);
}

#[derive(Clone, Default)]
struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl HarvestObserver for RecordingObserver {
    fn iteration_measured(&mut self, state: &RunState, _target: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("measured {}", state.current));
    }

    fn candidates_collected(&mut self, found: usize, target: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("collected {}/{}", found, target));
    }

    fn item_extracted(&mut self, position: usize, total: usize, record: &Record) {
        self.events
            .lock()
            .unwrap()
            .push(format!("extracted {}/{} {}", position, total, record.name()));
    }

    fn item_skipped(&mut self, total: usize, item: &SkippedItem) {
        self.events
            .lock()
            .unwrap()
            .push(format!("skipped {}/{}", item.position, total));
    }

    fn run_complete(&mut self, records: usize, candidates: usize, skipped: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("complete {} {} {}", records, candidates, skipped));
    }
}

#[tokio::test]
async fn test_observer_checkpoints() {
    let mut session = uniform_pages(ScriptedSession::new(vec![2]), 2).timing_out(place_url(0));
    let observer = RecordingObserver::default();
    let events = observer.events.clone();

    let mut harvester = Harvester::new(create_test_config(2, 5))
        .unwrap()
        .with_observer(observer);
    harvester.run(&mut session).await.unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "measured 2".to_string(),
            "collected 2/2".to_string(),
            "skipped 1/2".to_string(),
            "extracted 2/2 Place 1".to_string(),
            "complete 1 2 1".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_harvest_to_markdown_report() {
    let mut session = ScriptedSession::new(vec![3])
        .page(place_url(0), place_page("Slice | Co", Some("4.6"), "1,234"))
        .page(place_url(1), place_page("Corner", Some("3.8"), "50"))
        .page(place_url(2), place_page("Unknown", None, "0"));

    let config = create_test_config(3, 5);
    let query = config.search.query.clone();
    let mut harvester = Harvester::new(config).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports/pizza.md");
    let report = Report::assemble(&harvest.catalog, RunMetadata::from_harvest(&harvest, &query, "cafebabe"));
    write_report(&report, ReportFormat::Markdown, &path).unwrap();

    let markdown = std::fs::read_to_string(&path).unwrap();
    assert!(markdown.contains("# Harvest Report: pizza in Brooklyn"));
    assert!(markdown.contains("| 1 | Slice \\| Co | Pizza restaurant | **4.6** | 1234 |"));
    assert!(markdown.contains("| 3 | Unknown | Pizza restaurant | N/A | 0 |"));
    assert!(markdown.contains("| **Total** | 3 | | 4.20 |"));
    assert!(markdown.contains("- **Config Hash**: cafebabe"));
}

#[tokio::test]
async fn test_harvest_to_json_report() {
    let mut session = uniform_pages(ScriptedSession::new(vec![2]), 2);
    let config = create_test_config(2, 5);
    let mut harvester = Harvester::new(config).unwrap();
    let harvest = harvester.run(&mut session).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let report = Report::assemble(&harvest.catalog, RunMetadata::from_harvest(&harvest, "pizza", "h"));
    write_report(&report, ReportFormat::Json, &path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["summary"]["count"], 2);
    assert_eq!(json["rows"][1]["index"], 2);
    assert_eq!(json["meta"]["stop_reason"], "target_reached");
}
