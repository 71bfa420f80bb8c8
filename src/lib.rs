#[macro_use]
mod macros;

pub mod analytics;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod demo;
pub mod display;
pub mod error;
pub mod geocode;
pub mod map;
pub mod pagination;
pub mod query;
pub mod types;
pub mod utils;
pub mod vote;

pub use analytics::{AnalyticsReport, IssueAnalytics, StatusCounts};
pub use backend::{IssueBackend, MemoryBackend, RestBackend, Session};
pub use config::Config;
pub use controller::BrowseController;
pub use error::{CivicError, Result};
pub use geocode::{Geocoder, LocationSearch, MapboxGeocoder, Place, SearchOutcome};
pub use map::{Camera, LngLatBounds, MapView, Marker, Viewport};
pub use pagination::{Page, paginate};
pub use query::{BrowseCriteria, Choice, SortKey, filter_issues};
pub use types::{
    Coordinates, ImageChange, ImageUpload, Issue, IssueCategory, IssueFields, IssueStatus,
    ProfileUpdate, UserProfile, Vote,
};
pub use vote::{VoteCoordinator, VoteOutcome, VoteState};
