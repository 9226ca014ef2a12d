use super::*;
use crate::graph::{Edge, EdgeReason, Group};
use chrono::{Duration, TimeZone};

struct Down;

impl Summarizer for Down {
    fn summarize(&self, _tabs: &[SyncTab]) -> Result<String> {
        Err(WeftError::RemoteSummary("offline".into()))
    }
}

fn sample() -> GraphSnapshot {
    GraphSnapshot::new(
        vec![
            Tab::new("A", "https://github.com/rust-lang/rust")
                .with_title("rust-lang/rust")
                .with_domain("github.com")
                .with_keywords(["rust"])
                .with_group("g1"),
            Tab::new("B", "https://docs.rs/serde")
                .with_title("serde docs")
                .with_domain("docs.rs")
                .with_keywords(["rust", "serde"])
                .with_group("g1"),
            Tab::new("C", "https://news.ycombinator.com")
                .with_domain("news.ycombinator.com"),
            Tab::new("D", "https://github.com/rust-lang/rust#readme")
                .with_domain("github.com")
                .duplicate_of("A"),
        ],
        vec![
            Edge::new("A", "B").weighted(0.9).because(EdgeReason::Similarity),
            Edge::new("A", "C").weighted(0.5).because(EdgeReason::Navigation),
        ],
        vec![Group::new("g1", "Rust", ["A", "B"])],
    )
}

fn session() -> Session {
    let mut session = Session::new(&Settings::default(), SearchHistory::in_memory());
    session.replace_snapshot(Ok(sample()));
    session
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
}

#[test]
fn failed_acquisition_degrades_to_empty() {
    let mut session = session();
    session.select("A").unwrap();
    session.replace_snapshot(Err(WeftError::Acquisition("storage gone".into())));
    assert!(session.snapshot().is_empty());
    assert!(session.selected().is_none());
    assert!(session.visible_tabs().is_empty());
}

#[test]
fn empty_query_shows_every_canonical_tab() {
    let session = session();
    let ids: Vec<&str> = session.visible_tabs().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(session.projection().nodes.len(), 3);
}

#[test]
fn domain_query_filters_views() {
    let mut session = session();
    session.set_query("@github");
    let ids: Vec<&str> = session.visible_tabs().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["A"]);
    assert_eq!(session.visible_groups().len(), 1);
    assert_eq!(session.projection().edges.len(), 0);
    // Not recorded until submitted
    assert!(session.history().list().is_empty());
}

#[test]
fn submit_records_history() {
    let mut session = session();
    session.submit_query("#serde");
    session.submit_query("@docs");
    session.submit_query("#serde");
    assert_eq!(session.history().list(), ["#serde", "@docs"]);
    assert_eq!(session.raw_query(), "#serde");
    assert_eq!(session.query().keyword.as_deref(), Some("serde"));
}

#[test]
fn details_include_group_and_related() {
    let mut session = session();
    assert!(session.details().is_none());
    session.select("A").unwrap();

    let details = session.details().unwrap();
    assert_eq!(details.tab.id, "A");
    assert_eq!(details.group_label, "Rust");
    let related: Vec<(&str, String)> = details
        .related
        .iter()
        .map(|r| (r.tab.id.as_str(), r.describe()))
        .collect();
    assert_eq!(
        related,
        vec![("B", "90% similar".to_string()), ("C", "Navigated".to_string())]
    );
}

#[test]
fn ranking_policy_comes_from_settings() {
    let settings = Settings {
        self_loop_policy: crate::graph::SelfLoopPolicy::Include,
        ..Settings::default()
    };
    let session = Session::new(&settings, SearchHistory::in_memory());
    assert_eq!(session.ranking_policy(), settings.ranking_policy());
    assert_eq!(session.ranking_policy().self_loops.label(), "Include self-loops");
}

#[test]
fn ungrouped_details() {
    let mut session = session();
    session.select("C").unwrap();
    assert_eq!(session.details().unwrap().group_label, UNGROUPED_LABEL);
}

#[test]
fn unknown_selection_is_rejected() {
    let mut session = session();
    session.select("B").unwrap();
    match session.select("nope") {
        Err(WeftError::UnknownTab(id)) => assert_eq!(id, "nope"),
        other => panic!("expected unknown tab error, got {other:?}"),
    }
    assert_eq!(session.selected(), Some("B"));
    session.clear_selection();
    assert!(session.selected().is_none());
}

#[test]
fn insights_fall_back_and_cache() {
    let mut session = session();
    assert!(session.stale_notice(now()).is_none());

    match session.insights(Some(&Down), &[], now()) {
        InsightOutcome::Ready(insight) => {
            assert!(insight.markdown.contains("**Tabs tracked:** 3 | **Knowledge Clusters:** 1"));
        }
        InsightOutcome::Empty => panic!("expected offline report"),
    }
    assert_eq!(
        session.stale_notice(now() + Duration::minutes(4)).as_deref(),
        Some("Last updated 4 min ago")
    );
}

#[test]
fn empty_outcome_keeps_cached_insight() {
    let mut session = session();
    session.insights(None, &[], now());
    session.replace_snapshot(Ok(GraphSnapshot::empty()));
    assert_eq!(session.insights(None, &[], now()), InsightOutcome::Empty);
    assert!(session.cached_insight().is_some());
}

#[test]
fn failed_import_leaves_snapshot() {
    let mut session = session();
    let before = session.export_json().unwrap();
    assert!(matches!(session.import_json("{not json"), Err(WeftError::Import(_))));
    assert_eq!(session.export_json().unwrap(), before);
}

#[test]
fn import_replaces_snapshot() {
    let mut session = session();
    session.select("B").unwrap();
    let summary = session
        .import_json(r#"{"tabs": [{"id": "x", "url": "https://x.example"}], "groups": []}"#)
        .unwrap();
    assert_eq!(summary, ImportSummary { tabs: 1, groups: 0 });
    assert_eq!(session.visible_tabs().len(), 1);
    assert!(session.selected().is_none());
}

#[test]
fn export_round_trips_through_import() {
    let mut session = session();
    let exported = session.export_json().unwrap();
    session.import_json(&exported).unwrap();
    assert_eq!(session.snapshot(), &sample());
}

#[test]
fn export_writes_dated_file() {
    let dir = tempfile::tempdir().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    let path = session().export_to_dir(dir.path(), today).unwrap();
    assert!(path.ends_with("weft_graph_2025-12-31.json"));
    let (imported, _) = GraphSnapshot::import_json(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(imported, sample());
}

#[test]
fn view_switching() {
    let mut session = session();
    assert_eq!(session.view(), View::Groups);
    session.set_view(View::Insights);
    assert_eq!(session.view().label(), "Insights");
}
