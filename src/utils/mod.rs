mod text;
pub mod validation;

pub use text::{contains_ignore_case, truncate_string};
pub use validation::{
    validate_coordinates, validate_issue_fields, validate_profile_update, validate_title,
};
