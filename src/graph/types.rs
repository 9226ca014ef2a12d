//! Graph entities as produced by the acquisition side.
//!
//! Field names follow the camelCase wire format used for snapshot ingestion
//! and import/export. Optional fields are read leniently: a value of the
//! wrong shape is treated as absent instead of failing the entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A visited page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub domain: Option<String>,
    /// Deduplicated, first-seen order kept.
    #[serde(
        default,
        deserialize_with = "lenient::keywords",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub keywords: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<String>,
    /// Id of the canonical tab this one duplicates.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub duplicate_of: Option<String>,
    #[serde(
        default,
        with = "epoch_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "epoch_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Tab {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: None,
            domain: None,
            keywords: Vec::new(),
            group_id: None,
            duplicate_of: None,
            added_at: None,
            last_accessed: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = dedup_keywords(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn duplicate_of(mut self, canonical: impl Into<String>) -> Self {
        self.duplicate_of = Some(canonical.into());
        self
    }

    pub fn with_added_at(mut self, at: DateTime<Utc>) -> Self {
        self.added_at = Some(at);
        self
    }

    /// Duplicates stay resolvable by id but are hidden from every view.
    pub fn is_duplicate(&self) -> bool {
        self.duplicate_of.is_some()
    }

    /// Title for list and detail views, falling back to the url.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }

    /// Most relevant activity time: when the tab was added, else last access.
    pub fn activity_time(&self) -> Option<DateTime<Utc>> {
        self.added_at.or(self.last_accessed)
    }
}

/// Why two tabs are related.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeReason {
    Navigation,
    Similarity,
    /// Any reason outside the known set, kept verbatim for export.
    Other(String),
}

impl EdgeReason {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeReason::Navigation => "navigation",
            EdgeReason::Similarity => "similarity",
            EdgeReason::Other(reason) => reason,
        }
    }

    pub fn is_navigation(&self) -> bool {
        *self == EdgeReason::Navigation
    }
}

impl From<&str> for EdgeReason {
    fn from(value: &str) -> Self {
        match value {
            "navigation" => EdgeReason::Navigation,
            "similarity" => EdgeReason::Similarity,
            other => EdgeReason::Other(other.to_string()),
        }
    }
}

impl Serialize for EdgeReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A weighted relation between two tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(deserialize_with = "lenient::id")]
    pub source: String,
    #[serde(deserialize_with = "lenient::id")]
    pub target: String,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub reason: Option<EdgeReason>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: None,
            reason: None,
        }
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn because(mut self, reason: EdgeReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// The endpoint opposite to `id`, if this edge touches it.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.reason.as_ref().is_some_and(EdgeReason::is_navigation)
    }
}

/// A topical cluster of tabs.
///
/// `size` is resolved once when the group is built: the declared size when
/// the producer supplied a non-zero one, otherwise the member count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GroupRecord", into = "GroupRecord")]
pub struct Group {
    pub id: String,
    pub label: String,
    /// Member ids in producer order. Repeats are tolerated.
    pub tab_ids: Vec<String>,
    declared_size: Option<usize>,
    size: usize,
}

impl Group {
    pub fn new<I, S>(id: impl Into<String>, label: impl Into<String>, tab_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupRecord {
            id: id.into(),
            label: label.into(),
            tab_ids: tab_ids.into_iter().map(Into::into).collect(),
            size: None,
        }
        .into()
    }

    pub fn with_declared_size(self, size: usize) -> Self {
        GroupRecord {
            size: Some(size),
            ..GroupRecord::from(self)
        }
        .into()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn declared_size(&self) -> Option<usize> {
        self.declared_size
    }
}

/// Wire shape of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupRecord {
    #[serde(deserialize_with = "lenient::id")]
    id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    label: String,
    #[serde(default, deserialize_with = "lenient::id_list")]
    tab_ids: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    size: Option<usize>,
}

impl From<GroupRecord> for Group {
    fn from(record: GroupRecord) -> Self {
        let size = record
            .size
            .filter(|s| *s > 0)
            .unwrap_or(record.tab_ids.len());
        Self {
            id: record.id,
            label: record.label,
            tab_ids: record.tab_ids,
            declared_size: record.size,
            size,
        }
    }
}

impl From<Group> for GroupRecord {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            label: group.label,
            tab_ids: group.tab_ids,
            size: group.declared_size,
        }
    }
}

fn dedup_keywords(keywords: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

/// Tolerant field readers for producer data.
mod lenient {
    use super::{dedup_keywords, EdgeReason};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn id_of(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Required identifier: a non-empty string or a number.
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        id_of(&value).ok_or_else(|| D::Error::custom("expected a string or numeric id"))
    }

    pub fn id_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::Array(items) => items.iter().filter_map(id_of).collect(),
            _ => Vec::new(),
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_text(d)?.unwrap_or_default())
    }

    /// Optional text; empty strings and non-strings read as absent.
    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
    }

    pub fn keywords<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::Array(items) => dedup_keywords(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string)),
            ),
            _ => Vec::new(),
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value.as_f64().filter(|w| w.is_finite()))
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value.as_u64().and_then(|n| usize::try_from(n).ok()))
    }

    pub fn reason<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EdgeReason>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::String(s) if !s.is_empty() => Some(EdgeReason::from(s.as_str())),
            _ => None,
        })
    }
}

/// Timestamps travel as epoch milliseconds. RFC 3339 strings are accepted on
/// input; anything unreadable is treated as absent.
mod epoch_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_some(&at.timestamp_millis()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(parse(&value))
    }

    fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(DateTime::from_timestamp_millis),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|at| at.with_timezone(&Utc))
                .ok()
                .or_else(|| s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)),
            _ => None,
        }
    }
}
