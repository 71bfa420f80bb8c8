//! Filtering, searching and sorting of issue collections.
//!
//! The browse list reduces the full collection in a fixed order: category,
//! then status, then free-text search, then a stable sort. Every stage but
//! the last only narrows, so membership does not depend on stage order.
//! Nothing here touches I/O; the same inputs always give the same output.

use std::fmt;
use std::str::FromStr;

use crate::error::CivicError;
use crate::types::{Issue, IssueCategory, IssueStatus};
use crate::utils::contains_ignore_case;

pub mod sort;

pub use sort::{SortKey, sort_by_location, sort_by_newest, sort_by_votes, sort_issues_by};

/// A criterion that is either unrestricted or pinned to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl<T> From<Option<T>> for Choice<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Choice::Only(v),
            None => Choice::All,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "all"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

impl<T: FromStr<Err = CivicError>> FromStr for Choice<T> {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Choice::All)
        } else {
            s.parse().map(Choice::Only)
        }
    }
}

/// Trait for issue filters
pub trait IssueFilter: Send + Sync {
    fn matches(&self, issue: &Issue) -> bool;
}

/// Keep issues of one category, or all
pub struct CategoryFilter {
    category: Choice<IssueCategory>,
}

impl CategoryFilter {
    pub fn new(category: Choice<IssueCategory>) -> Self {
        Self { category }
    }
}

impl IssueFilter for CategoryFilter {
    fn matches(&self, issue: &Issue) -> bool {
        self.category.admits(&issue.category)
    }
}

/// Keep issues in one status, or all
pub struct StatusFilter {
    status: Choice<IssueStatus>,
}

impl StatusFilter {
    pub fn new(status: Choice<IssueStatus>) -> Self {
        Self { status }
    }
}

impl IssueFilter for StatusFilter {
    fn matches(&self, issue: &Issue) -> bool {
        self.status.admits(&issue.status)
    }
}

/// Case-insensitive substring match on title, description or location.
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_string(),
        }
    }
}

impl IssueFilter for SearchFilter {
    fn matches(&self, issue: &Issue) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        contains_ignore_case(&issue.title, &self.needle)
            || contains_ignore_case(&issue.description, &self.needle)
            || contains_ignore_case(&issue.location, &self.needle)
    }
}

/// An assembled query: filter stages applied in insertion order, then a sort.
pub struct IssueQuery {
    filters: Vec<Box<dyn IssueFilter>>,
    sort_by: SortKey,
    limit: Option<usize>,
}

impl IssueQuery {
    /// Run the query over a collection, returning a new vector.
    pub fn apply(&self, issues: &[Issue]) -> Vec<Issue> {
        let mut result: Vec<Issue> = issues
            .iter()
            .filter(|issue| self.filters.iter().all(|f| f.matches(issue)))
            .cloned()
            .collect();

        sort_issues_by(&mut result, self.sort_by);

        if let Some(limit) = self.limit {
            result.truncate(limit);
        }

        result
    }
}

/// Builder for [`IssueQuery`]
#[derive(Default)]
pub struct IssueQueryBuilder {
    filters: Vec<Box<dyn IssueFilter>>,
    sort_by: SortKey,
    limit: Option<usize>,
}

impl IssueQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Box<dyn IssueFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> IssueQuery {
        IssueQuery {
            filters: self.filters,
            sort_by: self.sort_by,
            limit: self.limit,
        }
    }
}

/// Browse list criteria as the user has set them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowseCriteria {
    pub category: Choice<IssueCategory>,
    pub status: Choice<IssueStatus>,
    pub search: String,
    pub sort: SortKey,
}

impl BrowseCriteria {
    /// Build the fixed category -> status -> search -> sort pipeline.
    pub fn to_query(&self) -> IssueQuery {
        IssueQueryBuilder::new()
            .with_filter(Box::new(CategoryFilter::new(self.category)))
            .with_filter(Box::new(StatusFilter::new(self.status)))
            .with_filter(Box::new(SearchFilter::new(&self.search)))
            .with_sort(self.sort)
            .build()
    }

    pub fn is_default(&self) -> bool {
        *self == BrowseCriteria::default()
    }
}

/// Reduce a collection to the browse view for `criteria`.
pub fn filter_issues(issues: &[Issue], criteria: &BrowseCriteria) -> Vec<Issue> {
    criteria.to_query().apply(issues)
}
