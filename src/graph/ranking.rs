//! Related-tab ranking by edge traversal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::snapshot::GraphSnapshot;
use super::types::{EdgeReason, Tab};

/// Number of related tabs shown in the details panel.
pub const DEFAULT_RELATED_LIMIT: usize = 5;

/// How to treat several edges connecting the same pair of tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateEdgePolicy {
    /// The first edge in snapshot order decides weight and reason.
    #[default]
    FirstEdgeWins,
    /// The heaviest edge decides weight and reason. The candidate keeps the
    /// position of its first edge, so ties still sort by edge order.
    MaxWeightWins,
}

impl DuplicateEdgePolicy {
    pub fn label(&self) -> &'static str {
        match self {
            DuplicateEdgePolicy::FirstEdgeWins => "First edge wins",
            DuplicateEdgePolicy::MaxWeightWins => "Strongest edge wins",
        }
    }
}

/// What an edge from a tab to itself contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
    /// A tab is never listed as related to itself.
    #[default]
    Skip,
    /// The loop yields the tab itself as a candidate, like any other edge.
    Include,
}

impl SelfLoopPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            SelfLoopPolicy::Skip => "Skip self-loops",
            SelfLoopPolicy::Include => "Include self-loops",
        }
    }
}

/// Edge handling rules for `related_tabs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankingPolicy {
    pub duplicate_edges: DuplicateEdgePolicy,
    pub self_loops: SelfLoopPolicy,
}

impl From<DuplicateEdgePolicy> for RankingPolicy {
    fn from(duplicate_edges: DuplicateEdgePolicy) -> Self {
        Self {
            duplicate_edges,
            ..Self::default()
        }
    }
}

/// A tab connected to the selected one.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedTab<'a> {
    pub tab: &'a Tab,
    pub weight: f64,
    pub reason: EdgeReason,
}

impl RelatedTab<'_> {
    /// Caption for the relation, e.g. "Navigated" or "87% similar".
    pub fn describe(&self) -> String {
        if self.reason.is_navigation() {
            "Navigated".to_string()
        } else {
            format!("{}% similar", (self.weight * 100.0).round() as i64)
        }
    }
}

/// Tabs related to `tab_id`, strongest first, at most `limit`.
///
/// Candidates whose id doesn't resolve are dropped. Self-loops and repeated
/// pairs follow `policy`.
pub fn related_tabs<'a>(
    snapshot: &'a GraphSnapshot,
    tab_id: &str,
    limit: usize,
    policy: impl Into<RankingPolicy>,
) -> Vec<RelatedTab<'a>> {
    let policy = policy.into();
    // candidate id -> index into `candidates`
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut candidates: Vec<(&str, f64, EdgeReason)> = Vec::new();

    for edge in snapshot.edges() {
        let Some(other) = edge.other_end(tab_id) else {
            continue;
        };
        if other == tab_id && policy.self_loops == SelfLoopPolicy::Skip {
            continue;
        }

        let weight = edge.weight.unwrap_or(0.0);
        let reason = edge.reason.clone().unwrap_or(EdgeReason::Similarity);

        match seen.get(other) {
            None => {
                seen.insert(other, candidates.len());
                candidates.push((other, weight, reason));
            }
            Some(&i) => {
                if policy.duplicate_edges == DuplicateEdgePolicy::MaxWeightWins && weight > candidates[i].1 {
                    candidates[i].1 = weight;
                    candidates[i].2 = reason;
                }
            }
        }
    }

    let mut related: Vec<RelatedTab<'a>> = candidates
        .into_iter()
        .filter_map(|(id, weight, reason)| {
            snapshot.tab(id).map(|tab| RelatedTab { tab, weight, reason })
        })
        .collect();

    // Stable: equal weights keep edge order
    related.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    related.truncate(limit);
    related
}
