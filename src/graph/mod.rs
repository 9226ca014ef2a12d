//! Graph data structures, ranking and projection.

pub mod projection;
pub mod ranking;
pub mod snapshot;
pub mod types;

pub use projection::{group_color, project, LayoutParams, Projection, ProjectedEdge, ProjectedNode};
pub use ranking::{
    related_tabs, DuplicateEdgePolicy, RankingPolicy, RelatedTab, SelfLoopPolicy,
    DEFAULT_RELATED_LIMIT,
};
pub use snapshot::{GraphSnapshot, ImportSummary, SnapshotStats};
pub use types::{Edge, EdgeReason, Group, Tab};
