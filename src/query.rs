//! Search query language over tabs and groups.
//!
//! A raw search string is case-folded and split into three independent
//! filters:
//! - `@word` restricts the tab domain (substring match)
//! - `#word` restricts tab keywords (substring match on any keyword)
//! - the remaining text matches titles and urls
//!
//! Only the first `@` and `#` token is used as a filter; every such token is
//! removed from the free text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::{GraphSnapshot, Group, Tab};

static DOMAIN_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("valid regex"));
static KEYWORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("valid regex"));

/// Parsed search filter. Absent parts impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub domain: Option<String>,
    pub keyword: Option<String>,
    pub text: Option<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let folded = raw.to_lowercase();

        let domain = DOMAIN_TOKEN
            .captures(&folded)
            .map(|c| c[1].to_string());
        let keyword = KEYWORD_TOKEN
            .captures(&folded)
            .map(|c| c[1].to_string());

        let without_keywords = KEYWORD_TOKEN.replace_all(&folded, "");
        let remainder = DOMAIN_TOKEN.replace_all(&without_keywords, "");
        let text = remainder.trim();

        Self {
            domain,
            keyword,
            text: (!text.is_empty()).then(|| text.to_string()),
        }
    }

    /// True when no filter is present.
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.keyword.is_none() && self.text.is_none()
    }

    /// Whether a tab passes every present filter. Duplicates never pass.
    pub fn matches_tab(&self, tab: &Tab) -> bool {
        if tab.is_duplicate() {
            return false;
        }
        if let Some(domain) = &self.domain {
            if !domain_matches(tab, domain) {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !keyword_matches(tab, keyword) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !text_matches(tab, text) {
                return false;
            }
        }
        true
    }

    /// Whether a group passes, given its resolvable members.
    ///
    /// Domain and keyword filters need at least one matching member each
    /// (not necessarily the same one). Free text matches the label or any
    /// member's title/url.
    pub fn matches_group(&self, group: &Group, members: &[&Tab]) -> bool {
        if let Some(domain) = &self.domain {
            if !members.iter().any(|t| domain_matches(t, domain)) {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !members.iter().any(|t| keyword_matches(t, keyword)) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let label_hit = group.label.to_lowercase().contains(text.as_str());
            if !label_hit && !members.iter().any(|t| text_matches(t, text)) {
                return false;
            }
        }
        true
    }
}

fn domain_matches(tab: &Tab, domain: &str) -> bool {
    tab.domain
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(domain))
}

fn keyword_matches(tab: &Tab, keyword: &str) -> bool {
    tab.keywords
        .iter()
        .any(|k| k.to_lowercase().contains(keyword))
}

fn text_matches(tab: &Tab, text: &str) -> bool {
    let in_title = tab
        .title
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains(text));
    in_title || tab.url.to_lowercase().contains(text)
}

/// A group together with its resolved members, as listed in the groups view.
#[derive(Debug, Clone)]
pub struct GroupView<'a> {
    pub group: &'a Group,
    pub tabs: Vec<&'a Tab>,
}

/// Tabs passing the query, in snapshot order.
pub fn filter_tabs<'a>(snapshot: &'a GraphSnapshot, query: &Query) -> Vec<&'a Tab> {
    snapshot
        .tabs()
        .iter()
        .filter(|t| query.matches_tab(t))
        .collect()
}

/// Groups passing the query, largest first (stable on ties).
pub fn filter_groups<'a>(snapshot: &'a GraphSnapshot, query: &Query) -> Vec<GroupView<'a>> {
    let mut views: Vec<GroupView<'a>> = snapshot
        .groups()
        .iter()
        .map(|group| GroupView {
            group,
            tabs: snapshot.tabs_of_group(group),
        })
        .filter(|view| query.is_empty() || query.matches_group(view.group, &view.tabs))
        .collect();
    views.sort_by(|a, b| b.group.size().cmp(&a.group.size()));
    views
}
