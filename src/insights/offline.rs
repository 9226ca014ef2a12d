//! Offline browsing report, built from the snapshot alone.
//!
//! Used whenever the remote summarizer is unreachable. The output is
//! deterministic for a given snapshot.

use std::collections::HashMap;

use crate::graph::{GraphSnapshot, Group};

pub const REPORT_TITLE: &str = "Browsing Memory Report";
pub const TOP_GROUPS: usize = 5;
pub const TOP_KEYWORDS: usize = 10;
pub const TOP_DOMAINS: usize = 5;

pub const NO_CLUSTERS: &str = "_No clusters found yet._";
pub const NO_THEMES: &str = "_Not enough data for themes._";
pub const NO_SOURCES: &str = "_No sources recorded yet._";

/// One entry of the top research topics list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedGroup {
    /// 1-based
    pub rank: usize,
    pub label: String,
    pub size: usize,
}

/// Report contents, independent of how they are displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Tabs without a duplicate marker
    pub tab_count: usize,
    pub group_count: usize,
    pub top_groups: Vec<RankedGroup>,
    pub top_keywords: Vec<String>,
    pub top_domains: Vec<String>,
}

/// Block-level items of a report, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportItem<'a> {
    Title(&'static str),
    Stats { tabs: usize, clusters: usize },
    Section(&'static str),
    RankedGroups(&'a [RankedGroup]),
    Keywords(&'a [String]),
    Domains(&'a [String]),
    /// Stands in for an empty ranked category
    Placeholder(&'static str),
    Spacer,
}

impl Report {
    pub fn items(&self) -> Vec<ReportItem<'_>> {
        let mut items = vec![
            ReportItem::Title(REPORT_TITLE),
            ReportItem::Stats {
                tabs: self.tab_count,
                clusters: self.group_count,
            },
            ReportItem::Spacer,
            ReportItem::Section("Top Research Topics"),
        ];
        items.push(if self.top_groups.is_empty() {
            ReportItem::Placeholder(NO_CLUSTERS)
        } else {
            ReportItem::RankedGroups(&self.top_groups)
        });

        items.push(ReportItem::Spacer);
        items.push(ReportItem::Section("Key Themes"));
        items.push(if self.top_keywords.is_empty() {
            ReportItem::Placeholder(NO_THEMES)
        } else {
            ReportItem::Keywords(&self.top_keywords)
        });

        items.push(ReportItem::Spacer);
        items.push(ReportItem::Section("Top Sources"));
        items.push(if self.top_domains.is_empty() {
            ReportItem::Placeholder(NO_SOURCES)
        } else {
            ReportItem::Domains(&self.top_domains)
        });
        items
    }

    /// Markdown-subset text understood by [`crate::insights::markdown`].
    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for item in self.items() {
            match item {
                ReportItem::Title(title) => lines.push(format!("# {}", title)),
                ReportItem::Stats { tabs, clusters } => lines.push(format!(
                    "**Tabs tracked:** {} | **Knowledge Clusters:** {}",
                    tabs, clusters
                )),
                ReportItem::Section(heading) => lines.push(format!("## {}", heading)),
                ReportItem::RankedGroups(groups) => {
                    for g in groups {
                        lines.push(format!("{}. **{}** ({} items)", g.rank, g.label, g.size));
                    }
                }
                ReportItem::Keywords(keywords) => lines.push(
                    keywords
                        .iter()
                        .map(|k| format!("`{}`", k))
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                ReportItem::Domains(domains) => {
                    for d in domains {
                        lines.push(format!("- {}", d));
                    }
                }
                ReportItem::Placeholder(text) => lines.push(text.to_string()),
                ReportItem::Spacer => lines.push(String::new()),
            }
        }
        lines.join("\n")
    }
}

/// Build the offline report. `None` when there are no tabs at all.
pub fn synthesize_offline(snapshot: &GraphSnapshot) -> Option<Report> {
    if snapshot.is_empty() {
        return None;
    }

    let mut groups: Vec<&Group> = snapshot.groups().iter().collect();
    groups.sort_by(|a, b| b.size().cmp(&a.size()));
    let top_groups = groups
        .iter()
        .take(TOP_GROUPS)
        .enumerate()
        .map(|(i, g)| RankedGroup {
            rank: i + 1,
            label: g.label.clone(),
            size: g.size(),
        })
        .collect();

    let keywords = snapshot
        .tabs()
        .iter()
        .flat_map(|t| t.keywords.iter().map(String::as_str));
    let domains = snapshot.tabs().iter().filter_map(|t| t.domain.as_deref());

    Some(Report {
        tab_count: snapshot.canonical_tabs().count(),
        group_count: snapshot.groups().len(),
        top_groups,
        top_keywords: top_by_count(keywords, TOP_KEYWORDS),
        top_domains: top_by_count(domains, TOP_DOMAINS),
    })
}

/// Most frequent values, ties broken by first appearance.
fn top_by_count<'a>(values: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(v, _)| v.to_string())
        .collect()
}
