//! Graph-to-layout projection.
//!
//! Selects the nodes and edges a force-directed renderer should draw and
//! derives their labels, colors and widths. Positions are left to the
//! rendering side; `LayoutParams` carries the tuning constants it should use.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{Graph, NodeIndex};
use serde::Serialize;

use super::snapshot::GraphSnapshot;
use super::types::{EdgeReason, Tab};
use crate::query::Query;
use crate::theme::{self, Rgb};

/// Maximum label length in characters before truncation
pub const LABEL_MAX_CHARS: usize = 30;

const UNTITLED: &str = "Untitled";

/// A tab as drawn by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedNode {
    pub id: String,
    pub label: String,
    pub color: Rgb,
    pub size: f32,
}

/// A relation as drawn by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: Option<f64>,
    pub reason: Option<EdgeReason>,
    pub width: f32,
    pub color: Rgb,
}

/// Force-directed simulation settings handed to the renderer.
///
/// These are fixed; nothing here depends on the data being drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutParams {
    pub name: &'static str,
    pub animate: bool,
    /// Start from random positions
    pub randomize: bool,
    pub node_repulsion: f32,
    pub ideal_edge_length: f32,
    pub edge_elasticity: f32,
    pub nesting_factor: f32,
    pub gravity: f32,
    pub num_iter: u32,
    pub initial_temp: f32,
    pub cooling_factor: f32,
    pub min_temp: f32,
    pub node_dimensions_include_labels: bool,
    pub padding: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            name: "cose",
            animate: false,
            randomize: true,
            node_repulsion: 6000.0,
            ideal_edge_length: 120.0,
            edge_elasticity: 100.0,
            nesting_factor: 1.2,
            gravity: 0.4,
            num_iter: 200,
            initial_temp: 300.0,
            cooling_factor: 0.95,
            min_temp: 1.0,
            node_dimensions_include_labels: true,
            padding: 40.0,
        }
    }
}

/// Camera limits for the graph viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportParams {
    pub wheel_sensitivity: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom step for zoom-in; zoom-out uses `zoom_out_factor`
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub fit_padding: f32,
}

impl Default for ViewportParams {
    fn default() -> Self {
        Self {
            wheel_sensitivity: 0.2,
            min_zoom: 0.3,
            max_zoom: 4.0,
            zoom_in_factor: 1.3,
            zoom_out_factor: 0.7,
            fit_padding: 30.0,
        }
    }
}

/// Everything a renderer needs to draw the graph view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub nodes: Vec<ProjectedNode>,
    pub edges: Vec<ProjectedEdge>,
    pub layout: LayoutParams,
    pub viewport: ViewportParams,
}

impl Projection {
    /// Node/edge set as a petgraph graph for layout adapters.
    ///
    /// Node weights are the projected nodes, in projection order.
    pub fn to_graph(&self) -> Graph<ProjectedNode, ProjectedEdge> {
        let mut graph = Graph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let idx = graph.add_node(node.clone());
            index.insert(node.id.as_str(), idx);
        }
        for edge in &self.edges {
            if let (Some(&a), Some(&b)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                graph.add_edge(a, b, edge.clone());
            }
        }
        graph
    }
}

/// Project the tabs passing `query` and the edges between them.
pub fn project(snapshot: &GraphSnapshot, query: &Query) -> Projection {
    let nodes: Vec<ProjectedNode> = snapshot
        .tabs()
        .iter()
        .filter(|t| query.matches_tab(t))
        .map(|tab| ProjectedNode {
            id: tab.id.clone(),
            label: node_label(tab),
            color: group_color(tab.group_id.as_deref()),
            size: theme::NODE_SIZE,
        })
        .collect();

    let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let edges: Vec<ProjectedEdge> = snapshot
        .edges()
        .iter()
        .filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
        .map(|edge| ProjectedEdge {
            id: format!("{}-{}", edge.source, edge.target),
            source: edge.source.clone(),
            target: edge.target.clone(),
            weight: edge.weight,
            reason: edge.reason.clone(),
            width: if edge.is_navigation() {
                theme::stroke_width::NAVIGATION_EDGE
            } else {
                theme::stroke_width::EDGE
            },
            color: if edge.is_navigation() {
                theme::edge::NAVIGATION
            } else {
                theme::edge::DEFAULT
            },
        })
        .collect();

    tracing::debug!("Projected {} nodes, {} edges", nodes.len(), edges.len());

    Projection {
        nodes,
        edges,
        layout: LayoutParams::default(),
        viewport: ViewportParams::default(),
    }
}

/// Title, else domain, else "Untitled", cut to `LABEL_MAX_CHARS`.
pub fn node_label(tab: &Tab) -> String {
    let text = tab
        .title
        .as_deref()
        .or(tab.domain.as_deref())
        .unwrap_or(UNTITLED);
    truncate(text, LABEL_MAX_CHARS)
}

/// Palette color for a group id; gray when ungrouped.
pub fn group_color(group_id: Option<&str>) -> Rgb {
    match group_id {
        Some(id) if !id.is_empty() => {
            let slot = numeric_hash(id) % theme::group::PALETTE.len() as u64;
            theme::group::PALETTE[slot as usize]
        }
        _ => theme::group::UNGROUPED,
    }
}

/// The digits of `id` read as one decimal number, 0 when there are none.
///
/// Only the low 18 digits are kept so long ids can't overflow; the value
/// modulo any power of ten is unaffected.
pub fn numeric_hash(id: &str) -> u64 {
    const KEEP: u64 = 1_000_000_000_000_000_000;
    id.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| (acc % (KEEP / 10)) * 10 + u64::from(d))
}

/// Cut to `max_chars` characters, marking the cut with "...".
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::Edge;
    use crate::graph::GraphSnapshot;
    use crate::theme::group;

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                Tab::new("a", "https://a.example")
                    .with_title("A fairly long page title that will be cut")
                    .with_group("group-3"),
                Tab::new("b", "https://b.example").with_domain("b.example"),
                Tab::new("c", "https://c.example").duplicate_of("a"),
                Tab::new("d", "https://d.example").with_group("cluster"),
            ],
            vec![
                Edge::new("a", "b").because(EdgeReason::Navigation),
                Edge::new("a", "c").weighted(1.0),
                Edge::new("b", "d").weighted(0.4),
                Edge::new("d", "ghost"),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_nodes_exclude_duplicates() {
        let projection = project(&snapshot(), &Query::default());
        let ids: Vec<&str> = projection.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "d"]);
        assert!(projection.edges.iter().all(|e| e.source != "c" && e.target != "c"));
    }

    #[test]
    fn test_labels() {
        let projection = project(&snapshot(), &Query::default());
        assert_eq!(projection.nodes[0].label, "A fairly long page title that ...");
        assert_eq!(projection.nodes[1].label, "b.example");
        assert_eq!(projection.nodes[2].label, "Untitled");
        assert_eq!(truncate("exactly", 7), "exactly");
    }

    #[test]
    fn test_edges_need_both_endpoints_and_navigation_is_wider() {
        let projection = project(&snapshot(), &Query::default());
        let ids: Vec<&str> = projection.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a-b", "b-d"]);
        assert_eq!(projection.edges[0].width, 2.0);
        assert_eq!(projection.edges[1].width, 1.0);
        assert_eq!(projection.edges[0].color, theme::edge::NAVIGATION);
        assert_eq!(projection.edges[1].color, theme::edge::DEFAULT);
    }

    #[test]
    fn test_edge_color_serializes_as_hex() {
        let projection = project(&snapshot(), &Query::default());
        let json = serde_json::to_value(&projection.edges[1]).unwrap();
        assert_eq!(json["color"], "#4a5568");
    }

    #[test]
    fn test_query_narrows_nodes_and_edges() {
        let projection = project(&snapshot(), &Query::parse("@b.example"));
        assert_eq!(projection.nodes.len(), 1);
        assert!(projection.edges.is_empty());
    }

    #[test]
    fn test_group_color_is_pure() {
        assert_eq!(group_color(None), group::UNGROUPED);
        assert_eq!(group_color(Some("")), group::UNGROUPED);
        assert_eq!(group_color(Some("cluster")), group::PURPLE);
        assert_eq!(group_color(Some("group-3")), group::EMERALD);
        assert_eq!(group_color(Some("g12")), group::AMBER);
        assert_eq!(group_color(Some("g12")), group_color(Some("g12")));
    }

    #[test]
    fn test_numeric_hash() {
        assert_eq!(numeric_hash("abc"), 0);
        assert_eq!(numeric_hash("g-1-2-3"), 123);
        // Long ids keep their last digit
        assert_eq!(numeric_hash("12345678901234567890123") % 10, 3);
    }

    #[test]
    fn test_layout_constants() {
        let layout = LayoutParams::default();
        assert_eq!(layout.node_repulsion, 6000.0);
        assert_eq!(layout.ideal_edge_length, 120.0);
        assert_eq!(layout.num_iter, 200);
        assert_eq!(layout.cooling_factor, 0.95);
    }

    #[test]
    fn test_to_graph() {
        let graph = project(&snapshot(), &Query::default()).to_graph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }
}
