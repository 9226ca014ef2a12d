//! Immutable graph snapshot with id lookup.
//!
//! A snapshot is built once from producer data and replaced wholesale on
//! refresh. Ingestion is tolerant: entries missing required fields are
//! skipped, the rest of the document still loads.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::types::{Edge, Group, Tab};
use crate::error::{Result, WeftError};

/// Tabs, edges and groups for one query/render cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphSnapshot {
    tabs: Vec<Tab>,
    edges: Vec<Edge>,
    groups: Vec<Group>,
    #[serde(skip)]
    tab_index: HashMap<String, usize>,
    #[serde(skip)]
    group_index: HashMap<String, usize>,
}

/// Counts reported back to the caller after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub tabs: usize,
    pub groups: usize,
}

/// Status bar counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotStats {
    /// Tabs without a duplicate marker
    pub tabs: usize,
    /// Distinct domains among those tabs (absent domain counts once)
    pub domains: usize,
    pub groups: usize,
    pub edges: usize,
}

impl GraphSnapshot {
    pub fn new(tabs: Vec<Tab>, edges: Vec<Edge>, groups: Vec<Group>) -> Self {
        let mut tab_index = HashMap::with_capacity(tabs.len());
        for (i, tab) in tabs.iter().enumerate() {
            // First occurrence of an id wins lookups
            tab_index.entry(tab.id.clone()).or_insert(i);
        }
        let mut group_index = HashMap::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            group_index.entry(group.id.clone()).or_insert(i);
        }
        Self {
            tabs,
            edges,
            groups,
            tab_index,
            group_index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a producer document, skipping malformed entries.
    ///
    /// Anything that isn't an object, or has a non-array collection, reads
    /// as an empty collection.
    pub fn from_value(value: &Value) -> Self {
        let tabs = read_entries::<Tab>(value.get("tabs"), "tab");
        let edges = read_entries::<Edge>(value.get("edges"), "edge");
        let groups = read_entries::<Group>(value.get("groups"), "group");
        Self::new(tabs, edges, groups)
    }

    /// Parse an import document.
    ///
    /// The document must be a JSON object; `tabs`, `edges` and `groups` must
    /// be arrays when present. Missing collections read as empty and
    /// individual malformed entries are skipped.
    pub fn import_json(text: &str) -> Result<(Self, ImportSummary)> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| WeftError::Import(format!("Invalid JSON file: {}", e)))?;

        let Some(object) = value.as_object() else {
            return Err(WeftError::Import(
                "Expected an object with tabs, edges and groups".to_string(),
            ));
        };

        for key in ["tabs", "edges", "groups"] {
            if let Some(field) = object.get(key) {
                if !field.is_array() {
                    return Err(WeftError::Import(format!("`{}` must be an array", key)));
                }
            }
        }

        let snapshot = Self::from_value(&value);
        let summary = ImportSummary {
            tabs: snapshot.tabs.len(),
            groups: snapshot.groups.len(),
        };
        tracing::info!(
            "Imported {} tabs, {} edges, {} groups",
            summary.tabs,
            snapshot.edges.len(),
            summary.groups
        );
        Ok((snapshot, summary))
    }

    /// Read a snapshot document from disk.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WeftError::Acquisition(format!("{}: {}", path.display(), e)))?;
        let value: Value = serde_json::from_str(&contents)
            .map_err(|e| WeftError::Acquisition(format!("{}: {}", path.display(), e)))?;
        let snapshot = Self::from_value(&value);
        tracing::info!(
            "Loaded snapshot from {:?}: {} tabs, {} edges, {} groups",
            path,
            snapshot.tabs.len(),
            snapshot.edges.len(),
            snapshot.groups.len()
        );
        Ok(snapshot)
    }

    /// Export document, order preserved.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Download name for an export made on `date`.
    pub fn export_file_name(date: NaiveDate) -> String {
        format!("weft_graph_{}.json", date.format("%Y-%m-%d"))
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Look up a tab by id. Duplicate-marked tabs resolve too.
    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tab_index.get(id).map(|&i| &self.tabs[i])
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.group_index.get(id).map(|&i| &self.groups[i])
    }

    /// Resolvable members of a group in member order. Repeated ids repeat.
    pub fn tabs_of_group(&self, group: &Group) -> Vec<&Tab> {
        group.tab_ids.iter().filter_map(|id| self.tab(id)).collect()
    }

    /// Tabs without a duplicate marker, in snapshot order.
    pub fn canonical_tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter().filter(|t| !t.is_duplicate())
    }

    /// Edges whose endpoints both resolve.
    pub fn resolved_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| self.tab_index.contains_key(&e.source) && self.tab_index.contains_key(&e.target))
    }

    pub fn stats(&self) -> SnapshotStats {
        let mut tabs = 0;
        let mut domains: HashSet<Option<&str>> = HashSet::new();
        for tab in self.canonical_tabs() {
            tabs += 1;
            domains.insert(tab.domain.as_deref());
        }
        SnapshotStats {
            tabs,
            domains: domains.len(),
            groups: self.groups.len(),
            edges: self.resolved_edges().count(),
        }
    }
}

impl PartialEq for GraphSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.tabs == other.tabs && self.edges == other.edges && self.groups == other.groups
    }
}

fn read_entries<T: DeserializeOwned>(field: Option<&Value>, kind: &str) -> Vec<T> {
    let Some(Value::Array(items)) = field else {
        if field.is_some_and(|f| !f.is_null()) {
            tracing::warn!("Snapshot field for {} entries is not an array, ignoring", kind);
        }
        return Vec::new();
    };

    let mut out = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        match T::deserialize(item) {
            Ok(entry) => out.push(entry),
            Err(e) => {
                skipped += 1;
                tracing::debug!("Skipping malformed {}: {}", kind, e);
            }
        }
    }
    if skipped > 0 {
        tracing::warn!("Skipped {} malformed {} entries", skipped, kind);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::EdgeReason;
    use serde_json::json;

    fn sample() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                Tab::new("t1", "https://docs.rs/tokio")
                    .with_title("tokio docs")
                    .with_domain("docs.rs")
                    .with_keywords(["rust", "async"])
                    .with_group("g1"),
                Tab::new("t2", "https://github.com/tokio-rs")
                    .with_domain("github.com")
                    .with_group("g1"),
                Tab::new("t3", "https://docs.rs/tokio?x")
                    .with_domain("docs.rs")
                    .duplicate_of("t1"),
            ],
            vec![
                Edge::new("t1", "t2").weighted(0.8).because(EdgeReason::Similarity),
                Edge::new("t1", "ghost").weighted(0.3),
            ],
            vec![Group::new("g1", "Async Rust", ["t1", "t2", "missing"])],
        )
    }

    #[test]
    fn test_lookup_resolves_duplicates() {
        let snapshot = sample();
        assert_eq!(snapshot.tab("t3").map(|t| t.is_duplicate()), Some(true));
        assert!(snapshot.tab("nope").is_none());
        assert_eq!(snapshot.group("g1").map(|g| g.label.as_str()), Some("Async Rust"));
    }

    #[test]
    fn test_tabs_of_group_skips_unresolvable() {
        let snapshot = sample();
        let group = snapshot.group("g1").unwrap();
        let ids: Vec<&str> = snapshot.tabs_of_group(group).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_resolved_edges_ignore_dangling() {
        let snapshot = sample();
        assert_eq!(snapshot.resolved_edges().count(), 1);
    }

    #[test]
    fn test_stats_exclude_duplicates() {
        let stats = sample().stats();
        assert_eq!(
            stats,
            SnapshotStats {
                tabs: 2,
                domains: 2,
                groups: 1,
                edges: 1
            }
        );
    }

    #[test]
    fn test_from_value_skips_malformed_entries() {
        let value = json!({
            "tabs": [
                {"id": "a", "url": "https://a.example"},
                {"url": "https://no-id.example"},
                "garbage"
            ],
            "edges": [{"source": "a"}, {"source": "a", "target": "a"}],
            "groups": {"not": "an array"}
        });
        let snapshot = GraphSnapshot::from_value(&value);
        assert_eq!(snapshot.tabs().len(), 1);
        assert_eq!(snapshot.edges().len(), 1);
        assert!(snapshot.groups().is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let snapshot = sample();
        let exported = snapshot.to_json().unwrap();
        let (imported, summary) = GraphSnapshot::import_json(&exported).unwrap();
        assert_eq!(imported, snapshot);
        assert_eq!(summary, ImportSummary { tabs: 3, groups: 1 });
        assert_eq!(imported.to_json().unwrap(), exported);
    }

    #[test]
    fn test_import_rejects_malformed_documents() {
        for doc in ["not json", "[1,2,3]", r#"{"tabs": "nope"}"#, r#"{"edges": 3}"#] {
            match GraphSnapshot::import_json(doc) {
                Err(WeftError::Import(reason)) => assert!(!reason.is_empty()),
                other => panic!("expected import error for {doc}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_stats_ignore_dangling_edges() {
        let snapshot = GraphSnapshot::new(
            vec![Tab::new("a", "https://a.example")],
            vec![Edge::new("a", "ghost"), Edge::new("x", "y")],
            Vec::new(),
        );
        assert_eq!(snapshot.stats().edges, 0);
    }

    #[test]
    fn test_import_accepts_missing_collections() {
        let (empty, summary) = GraphSnapshot::import_json("{}").unwrap();
        assert!(empty.is_empty());
        assert_eq!(summary, ImportSummary { tabs: 0, groups: 0 });

        let (edges_only, _) =
            GraphSnapshot::import_json(r#"{"edges": [{"source": "a", "target": "b"}]}"#).unwrap();
        assert!(edges_only.tabs().is_empty());
        assert_eq!(edges_only.edges().len(), 1);
        assert_eq!(edges_only.stats().edges, 0);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(GraphSnapshot::export_file_name(date), "weft_graph_2025-03-07.json");
    }
}
