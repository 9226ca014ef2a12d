//! Activity strip shown above the insight report.

use chrono::Timelike;

use crate::graph::projection::truncate;
use crate::graph::{GraphSnapshot, Group};

pub const HOURS: usize = 24;
pub const MAX_GROUP_BUCKETS: usize = 12;
pub const GROUP_LABEL_MAX_CHARS: usize = 15;

/// Shortest bar, in percent of the strip height
pub const MIN_BAR_PERCENT: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityBucket {
    pub label: String,
    pub count: usize,
    /// Set for group buckets so a click can select the group
    pub group_id: Option<String>,
}

/// Hourly buckets when any tab carries a timestamp, otherwise the largest
/// groups as a proxy. Empty when there are no tabs.
pub fn activity(snapshot: &GraphSnapshot) -> Vec<ActivityBucket> {
    if snapshot.is_empty() {
        return Vec::new();
    }

    let mut hours = [0usize; HOURS];
    let mut timed = 0;
    for time in snapshot.tabs().iter().filter_map(|t| t.activity_time()) {
        hours[time.hour() as usize] += 1;
        timed += 1;
    }

    if timed > 0 {
        return hours
            .iter()
            .enumerate()
            .map(|(h, &count)| ActivityBucket {
                label: format!("{}:00", h),
                count,
                group_id: None,
            })
            .collect();
    }

    let mut groups: Vec<&Group> = snapshot.groups().iter().collect();
    groups.sort_by(|a, b| b.size().cmp(&a.size()));
    groups
        .into_iter()
        .take(MAX_GROUP_BUCKETS)
        .map(|g| ActivityBucket {
            label: truncate(&g.label, GROUP_LABEL_MAX_CHARS),
            count: g.size(),
            group_id: Some(g.id.clone()),
        })
        .collect()
}

/// Largest bucket count, at least 1.
pub fn max_count(buckets: &[ActivityBucket]) -> usize {
    buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1)
}

/// Bar height in percent, never below `MIN_BAR_PERCENT`.
pub fn bar_percent(bucket: &ActivityBucket, max: usize) -> f32 {
    let pct = bucket.count as f32 / max.max(1) as f32 * 100.0;
    pct.max(MIN_BAR_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Tab;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_no_tabs_no_buckets() {
        let snapshot = GraphSnapshot::new(Vec::new(), Vec::new(), vec![Group::new("g", "G", ["x"])]);
        assert!(activity(&snapshot).is_empty());
    }

    #[test]
    fn test_hourly_buckets() {
        let at = |h| Utc.with_ymd_and_hms(2025, 1, 2, h, 15, 0).unwrap();
        let mut late = Tab::new("3", "u3");
        late.last_accessed = Some(at(23));
        let snapshot = GraphSnapshot::new(
            vec![
                Tab::new("1", "u1").with_added_at(at(9)),
                Tab::new("2", "u2").with_added_at(at(9)),
                late,
                Tab::new("4", "u4"),
            ],
            Vec::new(),
            Vec::new(),
        );
        let buckets = activity(&snapshot);
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[0].label, "0:00");
        assert_eq!(buckets[9].count, 2);
        assert_eq!(buckets[23].count, 1);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(max_count(&buckets), 2);
    }

    #[test]
    fn test_group_fallback() {
        let groups: Vec<Group> = (0..14)
            .map(|i| Group::new(format!("g{}", i), format!("Group number {}", i), ["1"]).with_declared_size(i + 1))
            .collect();
        let snapshot = GraphSnapshot::new(vec![Tab::new("1", "u1")], Vec::new(), groups);
        let buckets = activity(&snapshot);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "Group number 13");
        assert_eq!(buckets[0].count, 14);
        assert_eq!(buckets[0].group_id.as_deref(), Some("g13"));
        assert_eq!(buckets[11].count, 3);
    }

    #[test]
    fn test_bar_percent_floor() {
        let bucket = ActivityBucket {
            label: "0:00".into(),
            count: 0,
            group_id: None,
        };
        assert_eq!(bar_percent(&bucket, 10), MIN_BAR_PERCENT);
        assert_eq!(max_count(&[]), 1);
    }
}
