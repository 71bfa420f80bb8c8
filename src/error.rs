use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicError {
    #[error("you must be signed in to do that")]
    Unauthenticated,

    #[error("issue '{0}' not found")]
    NotFound(String),

    #[error("you have already voted on issue '{0}'")]
    AlreadyVoted(String),

    #[error("a vote on issue '{0}' is already in flight")]
    VoteInFlight(String),

    #[error("issue '{0}' can only be changed by its reporter while pending")]
    NotEditable(String),

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("invalid category '{0}' (expected one of: road, water, sanitation, electricity, other)")]
    InvalidCategory(String),

    #[error("invalid status '{0}' (expected one of: pending, in-progress, resolved)")]
    InvalidStatus(String),

    #[error("invalid sort key '{0}' (expected one of: newest, votes, location)")]
    InvalidSortKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl CivicError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CivicError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_category(s: String) -> Self {
        CivicError::InvalidCategory(s)
    }

    pub fn invalid_status(s: String) -> Self {
        CivicError::InvalidStatus(s)
    }

    pub fn invalid_sort_key(s: String) -> Self {
        CivicError::InvalidSortKey(s)
    }

    /// True for the request-failure catch-all (network or backend).
    pub fn is_network_or_backend(&self) -> bool {
        matches!(
            self,
            CivicError::Backend { .. } | CivicError::Http(_) | CivicError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CivicError>;
