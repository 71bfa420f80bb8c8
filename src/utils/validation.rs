//! Shared validation rules for issue and profile input.
//!
//! Every entry point (CLI, backend clients, tests) goes through these so
//! that the limits stay in one place.

use crate::error::{CivicError, Result};
use crate::types::{IssueFields, ProfileUpdate};

// ============================================================================
// Constants
// ============================================================================

pub const MIN_TITLE_LENGTH: usize = 5;
pub const MAX_TITLE_LENGTH: usize = 100;

pub const MIN_DESCRIPTION_LENGTH: usize = 20;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

pub const MIN_LOCATION_LENGTH: usize = 5;
pub const MAX_LOCATION_LENGTH: usize = 200;

pub const MAX_PROFILE_NAME_LENGTH: usize = 100;
pub const MAX_BIO_LENGTH: usize = 500;

// ============================================================================
// Field Validation
// ============================================================================

/// Checks a trimmed text field against inclusive character bounds.
fn validate_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(CivicError::validation(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(CivicError::validation(
            field,
            format!("cannot exceed {max} characters"),
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<()> {
    validate_length("title", title, MIN_TITLE_LENGTH, MAX_TITLE_LENGTH)?;
    if title.chars().any(|c| c.is_control()) {
        return Err(CivicError::validation(
            "title",
            "must not contain control characters",
        ));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<()> {
    validate_length(
        "description",
        description,
        MIN_DESCRIPTION_LENGTH,
        MAX_DESCRIPTION_LENGTH,
    )
}

pub fn validate_location(location: &str) -> Result<()> {
    validate_length(
        "location",
        location,
        MIN_LOCATION_LENGTH,
        MAX_LOCATION_LENGTH,
    )
}

/// Latitude and longitude travel together and must be in WGS84 range.
pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<()> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(CivicError::validation(
                    "latitude",
                    "must be between -90 and 90",
                ));
            }
            if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                return Err(CivicError::validation(
                    "longitude",
                    "must be between -180 and 180",
                ));
            }
            Ok(())
        }
        (Some(_), None) => Err(CivicError::validation(
            "longitude",
            "is required when latitude is set",
        )),
        (None, Some(_)) => Err(CivicError::validation(
            "latitude",
            "is required when longitude is set",
        )),
    }
}

/// Validates the full issue form.
pub fn validate_issue_fields(fields: &IssueFields) -> Result<()> {
    validate_title(&fields.title)?;
    validate_description(&fields.description)?;
    validate_location(&fields.location)?;
    validate_coordinates(fields.latitude, fields.longitude)
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<()> {
    if let Some(name) = &update.name
        && name.trim().chars().count() > MAX_PROFILE_NAME_LENGTH
    {
        return Err(CivicError::validation(
            "name",
            format!("cannot exceed {MAX_PROFILE_NAME_LENGTH} characters"),
        ));
    }
    if let Some(bio) = &update.bio
        && bio.chars().count() > MAX_BIO_LENGTH
    {
        return Err(CivicError::validation(
            "bio",
            format!("cannot exceed {MAX_BIO_LENGTH} characters"),
        ));
    }
    Ok(())
}
