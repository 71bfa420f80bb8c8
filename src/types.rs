use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::CivicError;

pub const CIVICSYNC_DIR: &str = ".civicsync";

/// Kind of civic problem an issue reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Road,
    Water,
    Sanitation,
    Electricity,
    Other,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 5] = [
        IssueCategory::Road,
        IssueCategory::Water,
        IssueCategory::Sanitation,
        IssueCategory::Electricity,
        IssueCategory::Other,
    ];

    /// Capitalized name for charts and tables.
    pub fn display_name(self) -> &'static str {
        match self {
            IssueCategory::Road => "Road",
            IssueCategory::Water => "Water",
            IssueCategory::Sanitation => "Sanitation",
            IssueCategory::Electricity => "Electricity",
            IssueCategory::Other => "Other",
        }
    }

    /// Single-letter glyph drawn inside a map marker.
    pub fn marker_glyph(self) -> char {
        match self {
            IssueCategory::Road => 'R',
            IssueCategory::Water => 'W',
            IssueCategory::Sanitation => 'S',
            IssueCategory::Electricity => 'E',
            IssueCategory::Other => 'O',
        }
    }

    /// Marker border color (hex).
    pub fn marker_color(self) -> &'static str {
        match self {
            IssueCategory::Road => "#F59E0B",
            IssueCategory::Water => "#2563EB",
            IssueCategory::Sanitation => "#22C55E",
            IssueCategory::Electricity => "#FACC15",
            IssueCategory::Other => "#6B7280",
        }
    }
}

enum_display_fromstr!(
    IssueCategory,
    CivicError::invalid_category,
    {
        Road => "road",
        Water => "water",
        Sanitation => "sanitation",
        Electricity => "electricity",
        Other => "other",
    }
);

pub const VALID_CATEGORIES: &[&str] = &["road", "water", "sanitation", "electricity", "other"];

/// Resolution stage. The usual path is pending -> in-progress -> resolved,
/// but owners may jump to any state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::Pending,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    ];
}

enum_display_fromstr!(
    IssueStatus,
    CivicError::invalid_status,
    {
        Pending => "pending",
        InProgress => "in-progress",
        Resolved => "resolved",
    }
);

pub const VALID_STATUSES: &[&str] = &["pending", "in-progress", "resolved"];

/// A WGS84 point. Latitude first, as people say it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A reported civic problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub location: String,
    pub status: IssueStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub votes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Issue {
    /// Map placement, if both coordinates are known.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    /// Whether `user_id` may edit or delete this issue from the client.
    ///
    /// Only the reporter, and only while pending. The backend's row-level
    /// rules remain the real gate.
    pub fn is_editable_by(&self, user_id: Option<&str>) -> bool {
        user_id == Some(self.user_id.as_str()) && self.status == IssueStatus::Pending
    }

    /// [`Issue::is_editable_by`] as an error: `Unauthenticated` with no
    /// viewer, `NotEditable` for anyone else or once work has started.
    pub fn ensure_editable_by(&self, user_id: Option<&str>) -> Result<(), CivicError> {
        if user_id.is_none() {
            return Err(CivicError::Unauthenticated);
        }
        if !self.is_editable_by(user_id) {
            return Err(CivicError::NotEditable(self.id.clone()));
        }
        Ok(())
    }
}

/// Fields a reporter supplies when creating or editing an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueFields {
    pub title: String,
    pub description: String,
    pub category: Option<IssueCategory>,
    pub location: String,
    pub status: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Photo attached to a create or update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What an update does to the stored image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageChange {
    #[default]
    Keep,
    Remove,
    Replace(ImageUpload),
}

/// One (issue, user) support record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vote {
    pub issue_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none()
    }
}
