//! Issue repository client.
//!
//! All persistence, auth and query semantics live in the hosted backend.
//! This module defines the operations the client consumes from it and two
//! implementations: [`RestBackend`] against the hosted REST surface, and
//! [`MemoryBackend`], an in-process stand-in with the same rules.

pub mod memory;
pub mod rest;

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::Result;
use crate::types::{ImageChange, ImageUpload, Issue, IssueFields, ProfileUpdate, UserProfile};

pub use memory::MemoryBackend;
pub use rest::RestBackend;

/// Storage bucket holding issue photos.
pub const IMAGE_BUCKET: &str = "issue-images";

/// The signed-in user, as far as the backend is concerned.
#[derive(Clone)]
pub struct Session {
    pub user_id: String,
    pub access_token: SecretString,
}

impl Session {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: SecretString::from(access_token.into()),
        }
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Operations consumed from the backend. Every call is scoped by the
/// caller's session; ownership checks happen on the backend side.
pub trait IssueBackend: Send + Sync {
    /// Id of the signed-in user, if any.
    fn current_user_id(&self) -> Option<String>;

    /// All issues, newest first.
    fn list_issues(&self) -> impl Future<Output = Result<Vec<Issue>>> + Send;

    fn get_issue(&self, id: &str) -> impl Future<Output = Result<Option<Issue>>> + Send;

    /// Issues reported by the signed-in user, newest first.
    fn user_issues(&self) -> impl Future<Output = Result<Vec<Issue>>> + Send;

    /// Create an issue owned by the signed-in user. The status is always
    /// `pending` regardless of what the fields request.
    fn create_issue(
        &self,
        fields: IssueFields,
        image: Option<ImageUpload>,
    ) -> impl Future<Output = Result<Issue>> + Send;

    /// Update an issue the signed-in user owns. `None` when the issue does
    /// not exist or belongs to someone else.
    fn update_issue(
        &self,
        id: &str,
        fields: IssueFields,
        image: ImageChange,
    ) -> impl Future<Output = Result<Option<Issue>>> + Send;

    /// Delete an issue the signed-in user owns. `false` when nothing matched.
    fn delete_issue(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Record the signed-in user's vote and return the issue with its new
    /// count. A second vote by the same user fails with `AlreadyVoted`.
    fn cast_vote(&self, issue_id: &str) -> impl Future<Output = Result<Issue>> + Send;

    /// Whether the signed-in user has voted on the issue. Always false when
    /// signed out.
    fn has_voted(&self, issue_id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Issues the signed-in user has voted on, newest first.
    fn voted_issues(&self) -> impl Future<Output = Result<Vec<Issue>>> + Send;

    fn get_profile(&self, user_id: &str) -> impl Future<Output = Result<UserProfile>> + Send;

    fn update_own_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = Result<UserProfile>> + Send;
}

/// Object name for an uploaded photo: upload time in millis, then the
/// original file name with path separators stripped.
pub(crate) fn image_object_name(upload: &ImageUpload, now_millis: i64) -> String {
    let base = upload
        .file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(&upload.file_name);
    format!("{now_millis}-{base}")
}
