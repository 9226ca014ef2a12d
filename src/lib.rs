//! Weft browsing knowledge graph core.
//!
//! Holds a snapshot of tabs, relations and topic groups, filters it with a
//! small query language, ranks related tabs, projects the graph for a
//! renderer and synthesizes insight reports.

pub mod api;
pub mod error;
pub mod graph;
pub mod history;
pub mod insights;
pub mod query;
pub mod session;
pub mod settings;
pub mod theme;

pub use error::{Result, WeftError};
pub use graph::{Edge, EdgeReason, GraphSnapshot, Group, Tab};
pub use query::Query;
pub use session::Session;
pub use settings::Settings;
