//! Session state for one panel: snapshot, query, selection, view, search
//! history and the last insight.
//!
//! Every core operation is a pure function over the snapshot; this type only
//! owns the mutable slots and hands them in.

use chrono::{DateTime, NaiveDate, Utc};

use crate::api::{Summarizer, SyncTab};
use crate::error::{Result, WeftError};
use crate::graph::{
    project, related_tabs, GraphSnapshot, ImportSummary, Projection,
    RankingPolicy, RelatedTab, SnapshotStats, Tab,
};
use crate::history::SearchHistory;
use crate::insights::{self, Insight, InsightOutcome};
use crate::query::{filter_groups, filter_tabs, GroupView, Query};
use crate::settings::Settings;

pub const UNGROUPED_LABEL: &str = "Ungrouped";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Groups,
    Graph,
    Insights,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Groups => "Groups",
            View::Graph => "Graph",
            View::Insights => "Insights",
        }
    }
}

/// Detail panel contents for the selected tab.
#[derive(Debug, Clone)]
pub struct TabDetails<'a> {
    pub tab: &'a Tab,
    pub group_label: &'a str,
    pub related: Vec<RelatedTab<'a>>,
}

pub struct Session {
    snapshot: GraphSnapshot,
    raw_query: String,
    query: Query,
    selected: Option<String>,
    view: View,
    history: SearchHistory,
    cached_insight: Option<Insight>,
    related_limit: usize,
    policy: RankingPolicy,
}

impl Session {
    pub fn new(settings: &Settings, history: SearchHistory) -> Self {
        Self {
            snapshot: GraphSnapshot::empty(),
            raw_query: String::new(),
            query: Query::default(),
            selected: None,
            view: View::default(),
            history,
            cached_insight: None,
            related_limit: settings.related_limit,
            policy: settings.ranking_policy(),
        }
    }

    pub fn set_related_limit(&mut self, limit: usize) {
        self.related_limit = limit;
    }

    pub fn ranking_policy(&self) -> RankingPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// Install a freshly acquired snapshot. A failed acquisition leaves the
    /// session with an empty snapshot.
    pub fn replace_snapshot(&mut self, acquired: Result<GraphSnapshot>) {
        self.snapshot = match acquired {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Snapshot unavailable: {}, showing empty graph", e);
                GraphSnapshot::empty()
            }
        };
        self.drop_stale_selection();
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Update the live filter without recording it.
    pub fn set_query(&mut self, raw: &str) {
        self.raw_query = raw.to_string();
        self.query = Query::parse(raw);
    }

    /// Apply a query and record it in the search history.
    pub fn submit_query(&mut self, raw: &str) {
        self.set_query(raw);
        self.history.add(raw);
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory {
        &mut self.history
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn visible_tabs(&self) -> Vec<&Tab> {
        filter_tabs(&self.snapshot, &self.query)
    }

    pub fn visible_groups(&self) -> Vec<GroupView<'_>> {
        filter_groups(&self.snapshot, &self.query)
    }

    pub fn projection(&self) -> Projection {
        project(&self.snapshot, &self.query)
    }

    pub fn stats(&self) -> SnapshotStats {
        self.snapshot.stats()
    }

    /// Select a tab by id. Unknown ids are an error and leave the selection
    /// unchanged.
    pub fn select(&mut self, tab_id: &str) -> Result<()> {
        if self.snapshot.tab(tab_id).is_none() {
            tracing::debug!("Ignoring selection of unknown tab {}", tab_id);
            return Err(WeftError::UnknownTab(tab_id.to_string()));
        }
        self.selected = Some(tab_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn details(&self) -> Option<TabDetails<'_>> {
        let tab = self.snapshot.tab(self.selected.as_deref()?)?;
        let group_label = tab
            .group_id
            .as_deref()
            .and_then(|id| self.snapshot.group(id))
            .map(|g| g.label.as_str())
            .unwrap_or(UNGROUPED_LABEL);
        Some(TabDetails {
            tab,
            group_label,
            related: related_tabs(&self.snapshot, &tab.id, self.related_limit, self.policy),
        })
    }

    /// Produce insights for the open tabs. A ready insight replaces the
    /// cached one; an empty outcome keeps it.
    pub fn insights(
        &mut self,
        summarizer: Option<&dyn Summarizer>,
        open_tabs: &[SyncTab],
        now: DateTime<Utc>,
    ) -> InsightOutcome {
        let outcome = insights::gather(summarizer, open_tabs, &self.snapshot, now);
        if let InsightOutcome::Ready(insight) = &outcome {
            self.cached_insight = Some(insight.clone());
        }
        outcome
    }

    pub fn cached_insight(&self) -> Option<&Insight> {
        self.cached_insight.as_ref()
    }

    /// "Last updated N min ago" for the cached insight, if any.
    pub fn stale_notice(&self, now: DateTime<Utc>) -> Option<String> {
        self.cached_insight.as_ref().map(|i| i.stale_notice(now))
    }

    /// Replace the snapshot with an imported document. On error the current
    /// snapshot stays as it was.
    pub fn import_json(&mut self, text: &str) -> Result<ImportSummary> {
        let (snapshot, summary) = GraphSnapshot::import_json(text).map_err(|e| {
            tracing::warn!("Import rejected: {}", e);
            e
        })?;
        self.snapshot = snapshot;
        self.drop_stale_selection();
        Ok(summary)
    }

    pub fn export_json(&self) -> Result<String> {
        self.snapshot.to_json()
    }

    pub fn export_file_name(&self, today: NaiveDate) -> String {
        GraphSnapshot::export_file_name(today)
    }

    /// Write the export document into `dir` under its dated name.
    pub fn export_to_dir(&self, dir: &std::path::Path, today: NaiveDate) -> Result<std::path::PathBuf> {
        let path = dir.join(self.export_file_name(today));
        std::fs::write(&path, self.export_json()?)
            .map_err(|e| WeftError::Persistence(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Exported graph to {:?}", path);
        Ok(path)
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = &self.selected {
            if self.snapshot.tab(id).is_none() {
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
