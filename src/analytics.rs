//! Read-only aggregates over an issue collection

use jiff::ToSpan;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde::Serialize;

use crate::map::{FALLBACK_POSITION, Marker};
use crate::query::{IssueQueryBuilder, SortKey};
use crate::types::{Issue, IssueCategory, IssueStatus};

/// Default trailing window for [`IssueAnalytics::temporal_counts`].
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Default length of the top-voted list.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: IssueCategory,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: Date,
    pub count: usize,
}

/// Counts of issues by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

impl StatusCounts {
    pub fn for_status(&self, status: IssueStatus) -> usize {
        match status {
            IssueStatus::Pending => self.pending,
            IssueStatus::InProgress => self.in_progress,
            IssueStatus::Resolved => self.resolved,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.resolved
    }
}

/// Everything the dashboard shows, in one value.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub total: usize,
    pub statuses: StatusCounts,
    pub categories: Vec<CategoryCount>,
    pub daily: Vec<DailyCount>,
    pub top_voted: Vec<Issue>,
    pub mapped: usize,
}

/// Analytics operations on issue collections
pub struct IssueAnalytics;

impl IssueAnalytics {
    pub fn status_counts(issues: &[Issue]) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for issue in issues {
            match issue.status {
                IssueStatus::Pending => counts.pending += 1,
                IssueStatus::InProgress => counts.in_progress += 1,
                IssueStatus::Resolved => counts.resolved += 1,
            }
        }
        counts
    }

    /// Issues per category. Categories with no issues are left out.
    pub fn category_distribution(issues: &[Issue]) -> Vec<CategoryCount> {
        IssueCategory::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                label: category.display_name(),
                count: issues.iter().filter(|i| i.category == category).count(),
            })
            .filter(|c| c.count > 0)
            .collect()
    }

    /// Issues created on each of the last `days` UTC days ending `today`,
    /// oldest first. Days with nothing still appear with a zero count.
    pub fn temporal_counts(issues: &[Issue], days: u32, today: Date) -> Vec<DailyCount> {
        let created: Vec<Date> = issues
            .iter()
            .map(|i| i.created_at.to_zoned(TimeZone::UTC).date())
            .collect();

        (0..i64::from(days))
            .rev()
            .map(|back| {
                let date = today.saturating_sub(back.days());
                DailyCount {
                    date,
                    count: created.iter().filter(|d| **d == date).count(),
                }
            })
            .collect()
    }

    /// The `limit` most voted issues. Ties keep collection order.
    pub fn top_voted(issues: &[Issue], limit: usize) -> Vec<Issue> {
        IssueQueryBuilder::new()
            .with_sort(SortKey::Votes)
            .with_limit(limit)
            .build()
            .apply(issues)
    }

    /// Markers for the issues that have coordinates.
    pub fn map_ready(issues: &[Issue]) -> Vec<Marker> {
        issues
            .iter()
            .filter(|i| i.coordinates().is_some())
            .map(|i| Marker::for_issue(i, FALLBACK_POSITION, false))
            .collect()
    }

    pub fn report(issues: &[Issue], days: u32, top: usize, today: Date) -> AnalyticsReport {
        AnalyticsReport {
            total: issues.len(),
            statuses: Self::status_counts(issues),
            categories: Self::category_distribution(issues),
            daily: Self::temporal_counts(issues, days, today),
            top_voted: Self::top_voted(issues, top),
            mapped: Self::map_ready(issues).len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use jiff::civil::date;

    use super::*;

    fn issue(id: &str, category: IssueCategory, created: &str, votes: u32) -> Issue {
        Issue {
            id: id.to_string(),
            title: format!("Issue {id}"),
            description: "Needs attention soon".to_string(),
            category,
            location: "Elm Street".to_string(),
            status: IssueStatus::Pending,
            created_at: created.parse::<Timestamp>().unwrap(),
            updated_at: Timestamp::UNIX_EPOCH,
            user_id: "u1".to_string(),
            image_url: None,
            votes,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_category_distribution_skips_empty() {
        let issues = vec![
            issue("1", IssueCategory::Water, "2026-10-01T10:00:00Z", 0),
            issue("2", IssueCategory::Road, "2026-10-01T10:00:00Z", 0),
            issue("3", IssueCategory::Water, "2026-10-01T10:00:00Z", 0),
        ];
        let dist = IssueAnalytics::category_distribution(&issues);
        assert_eq!(
            dist,
            [
                CategoryCount {
                    category: IssueCategory::Road,
                    label: "Road",
                    count: 1
                },
                CategoryCount {
                    category: IssueCategory::Water,
                    label: "Water",
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_temporal_counts_window() {
        let issues = vec![
            issue("1", IssueCategory::Road, "2026-10-19T23:59:00Z", 0),
            issue("2", IssueCategory::Road, "2026-10-19T00:00:00Z", 0),
            issue("3", IssueCategory::Road, "2026-10-13T12:00:00Z", 0),
            issue("4", IssueCategory::Road, "2026-10-12T12:00:00Z", 0),
        ];
        let counts = IssueAnalytics::temporal_counts(&issues, 7, date(2026, 10, 19));
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[0].date, date(2026, 10, 13));
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[6].date, date(2026, 10, 19));
        assert_eq!(counts[6].count, 2);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_top_voted_limits_and_orders() {
        let issues = vec![
            issue("a", IssueCategory::Road, "2026-10-01T10:00:00Z", 3),
            issue("b", IssueCategory::Road, "2026-10-01T10:00:00Z", 9),
            issue("c", IssueCategory::Road, "2026-10-01T10:00:00Z", 3),
        ];
        let ids: Vec<String> = IssueAnalytics::top_voted(&issues, 2)
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_map_ready_requires_coordinates() {
        let mut placed = issue("1", IssueCategory::Road, "2026-10-01T10:00:00Z", 0);
        placed.latitude = Some(1.0);
        placed.longitude = Some(2.0);
        let unplaced = issue("2", IssueCategory::Road, "2026-10-01T10:00:00Z", 0);
        let markers = IssueAnalytics::map_ready(&[placed, unplaced]);
        assert_eq!(markers.len(), 1);
        assert!(markers[0].placed);
    }

    #[test]
    fn test_status_counts_total() {
        let mut resolved = issue("2", IssueCategory::Road, "2026-10-01T10:00:00Z", 0);
        resolved.status = IssueStatus::Resolved;
        let issues = vec![
            issue("1", IssueCategory::Road, "2026-10-01T10:00:00Z", 0),
            resolved,
        ];
        let counts = IssueAnalytics::status_counts(&issues);
        assert_eq!(counts.for_status(IssueStatus::Pending), 1);
        assert_eq!(counts.for_status(IssueStatus::Resolved), 1);
        assert_eq!(counts.total(), 2);
    }
}
