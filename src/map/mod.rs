//! Map view state, kept in step with the browse list.
//!
//! The map owns its own category and status sets, separate from the list's
//! single-choice filters. The two are coupled only at two edges (see
//! [`MapView::sync_external_category`] and [`MapView::toggle_category`])
//! rather than bound both ways.

pub mod bounds;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{Coordinates, Issue, IssueCategory, IssueStatus};
use crate::utils::contains_ignore_case;

pub use bounds::{Camera, FIT_MAX_ZOOM, FIT_PADDING, FOCUS_ZOOM, LngLatBounds, Viewport};

/// Where markers without coordinates are drawn.
pub const FALLBACK_POSITION: Coordinates = Coordinates {
    lat: 40.7128,
    lng: -74.006,
};

/// Category and status sets plus a title search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFilters {
    pub categories: BTreeSet<IssueCategory>,
    pub statuses: BTreeSet<IssueStatus>,
    pub search: String,
}

impl Default for MapFilters {
    /// Every category; resolved issues hidden.
    fn default() -> Self {
        Self {
            categories: IssueCategory::ALL.into_iter().collect(),
            statuses: [IssueStatus::Pending, IssueStatus::InProgress]
                .into_iter()
                .collect(),
            search: String::new(),
        }
    }
}

impl MapFilters {
    pub fn matches(&self, issue: &Issue) -> bool {
        self.categories.contains(&issue.category)
            && self.statuses.contains(&issue.status)
            && (self.search.is_empty() || contains_ignore_case(&issue.title, &self.search))
    }

    /// The one selected category, if exactly one is.
    pub fn single_category(&self) -> Option<IssueCategory> {
        match self.categories.len() {
            1 => self.categories.iter().next().copied(),
            _ => None,
        }
    }
}

/// A drawable marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub issue_id: String,
    pub title: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub votes: u32,
    /// Border color for the category, as hex.
    pub color: &'static str,
    pub position: Coordinates,
    /// False when the issue has no coordinates and sits at the fallback.
    pub placed: bool,
    pub selected: bool,
}

impl Marker {
    pub fn for_issue(issue: &Issue, fallback: Coordinates, selected: bool) -> Self {
        let coordinates = issue.coordinates();
        Self {
            issue_id: issue.id.clone(),
            title: issue.title.clone(),
            category: issue.category,
            status: issue.status,
            votes: issue.votes,
            color: issue.category.marker_color(),
            position: coordinates.unwrap_or(fallback),
            placed: coordinates.is_some(),
            selected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapView {
    filters: MapFilters,
    selected: Option<String>,
    camera: Camera,
    viewport: Viewport,
    fallback: Coordinates,
    /// Last external category seen, for edge detection.
    last_external: Option<IssueCategory>,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(Viewport::default(), FALLBACK_POSITION)
    }
}

impl MapView {
    pub fn new(viewport: Viewport, fallback: Coordinates) -> Self {
        Self {
            filters: MapFilters::default(),
            selected: None,
            camera: Camera::default(),
            viewport,
            fallback,
            last_external: None,
        }
    }

    pub fn filters(&self) -> &MapFilters {
        &self.filters
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Issues passing the map filters, in collection order.
    pub fn visible_issues<'a>(&self, issues: &'a [Issue]) -> Vec<&'a Issue> {
        issues.iter().filter(|i| self.filters.matches(i)).collect()
    }

    pub fn markers(&self, issues: &[Issue]) -> Vec<Marker> {
        self.visible_issues(issues)
            .into_iter()
            .map(|issue| {
                let selected = self.selected.as_deref() == Some(issue.id.as_str());
                Marker::for_issue(issue, self.fallback, selected)
            })
            .collect()
    }

    /// Fit the camera around the visible markers that have coordinates.
    ///
    /// Needs at least two such markers; otherwise the camera stays put.
    /// Returns whether the camera moved.
    pub fn reframe(&mut self, issues: &[Issue]) -> bool {
        let placed: Vec<Coordinates> = self
            .visible_issues(issues)
            .into_iter()
            .filter_map(Issue::coordinates)
            .collect();
        if placed.len() < 2 {
            return false;
        }
        let Some(bounds) = LngLatBounds::from_points(placed) else {
            return false;
        };
        self.camera = Camera::fit(&bounds, self.viewport, FIT_PADDING, FIT_MAX_ZOOM);
        tracing::debug!(zoom = self.camera.zoom, "map reframed");
        true
    }

    /// Select an issue from a marker or the companion list and fly to it.
    ///
    /// Unknown ids are ignored. An issue without coordinates is selected
    /// but the camera does not move.
    pub fn select_issue(&mut self, issues: &[Issue], issue_id: &str) -> bool {
        let Some(issue) = issues.iter().find(|i| i.id == issue_id) else {
            return false;
        };
        self.selected = Some(issue.id.clone());
        if let Some(point) = issue.coordinates() {
            self.camera = Camera::focused_on(point);
        }
        true
    }

    /// Click on empty map.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Follow the shared category chosen elsewhere.
    ///
    /// Fires only on change: a newly set category collapses the set to it;
    /// clearing while exactly one category is selected restores all.
    pub fn sync_external_category(&mut self, external: Option<IssueCategory>) {
        if external == self.last_external {
            return;
        }
        self.last_external = external;
        match external {
            Some(category) => {
                self.filters.categories = BTreeSet::from([category]);
            }
            None if self.filters.categories.len() == 1 => {
                self.filters.categories = IssueCategory::ALL.into_iter().collect();
            }
            None => {}
        }
    }

    /// Tick or untick a category checkbox. Returns the shared category the
    /// rest of the page should now use: the remaining one if exactly one is
    /// left, otherwise none.
    pub fn toggle_category(&mut self, category: IssueCategory, on: bool) -> Option<IssueCategory> {
        if on {
            self.filters.categories.insert(category);
        } else {
            self.filters.categories.remove(&category);
        }
        let shared = self.filters.single_category();
        self.last_external = shared;
        shared
    }

    pub fn toggle_status(&mut self, status: IssueStatus, on: bool) {
        if on {
            self.filters.statuses.insert(status);
        } else {
            self.filters.statuses.remove(&status);
        }
    }

    pub fn set_search(&mut self, text: &str) {
        self.filters.search = text.trim().to_string();
    }

    /// Back to the default sets with no search and no shared category.
    pub fn reset_filters(&mut self) {
        self.filters = MapFilters::default();
        self.last_external = None;
    }
}
