//! Remote summarizer client.

mod client;

pub use client::{ApiClient, SyncTab};

use crate::error::Result;

/// Anything that can turn the open tabs into an insight report.
pub trait Summarizer {
    /// Markdown-subset report for `tabs`.
    fn summarize(&self, tabs: &[SyncTab]) -> Result<String>;
}
