//! Insight reports: remote summary with offline fallback.

pub mod markdown;
pub mod offline;
pub mod timeline;

use chrono::{DateTime, Utc};

pub use markdown::{Block, Inline};
pub use offline::{synthesize_offline, Report};
pub use timeline::{activity, ActivityBucket};

use crate::api::{Summarizer, SyncTab};
use crate::graph::GraphSnapshot;

pub const EMPTY_STATE: &str = "No browsing data yet.";
pub const EMPTY_STATE_HINT: &str = "Browse some tabs to build your knowledge graph.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    Remote,
    Offline,
}

/// A rendered report and when it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub source: InsightSource,
    pub markdown: String,
    pub blocks: Vec<Block>,
    pub generated_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(source: InsightSource, markdown: String, generated_at: DateTime<Utc>) -> Self {
        let blocks = markdown::parse(&markdown);
        Self {
            source,
            markdown,
            blocks,
            generated_at,
        }
    }

    /// Whole minutes since generation, rounded to nearest.
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        let millis = (now - self.generated_at).num_milliseconds().max(0);
        (millis + 30_000) / 60_000
    }

    pub fn stale_notice(&self, now: DateTime<Utc>) -> String {
        format!("Last updated {} min ago", self.age_minutes(now))
    }

    pub fn to_html(&self) -> String {
        markdown::to_html(&self.blocks)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsightOutcome {
    Ready(Insight),
    /// Neither source had anything to say
    Empty,
}

/// Ask the summarizer first; on any failure fall back to the offline report.
pub fn gather(
    summarizer: Option<&dyn Summarizer>,
    open_tabs: &[SyncTab],
    snapshot: &GraphSnapshot,
    now: DateTime<Utc>,
) -> InsightOutcome {
    if let Some(summarizer) = summarizer {
        match summarizer.summarize(open_tabs) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!("Received remote insights ({} chars)", text.len());
                return InsightOutcome::Ready(Insight::new(InsightSource::Remote, text, now));
            }
            Ok(_) => tracing::warn!("Remote summarizer returned no insights, using offline report"),
            Err(e) => tracing::warn!("Remote summarizer failed: {}, using offline report", e),
        }
    }

    match synthesize_offline(snapshot) {
        Some(report) => InsightOutcome::Ready(Insight::new(
            InsightSource::Offline,
            report.to_markdown(),
            now,
        )),
        None => InsightOutcome::Empty,
    }
}
