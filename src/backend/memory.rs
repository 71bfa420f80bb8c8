//! In-process backend.
//!
//! Holds issues, votes and profiles behind one lock, so the (issue, user)
//! uniqueness of votes and the counter increment happen atomically, the way
//! the hosted database's unique index and trigger do. Clones share state;
//! [`MemoryBackend::as_user`] gives another user's view of the same data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use jiff::Timestamp;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{IMAGE_BUCKET, IssueBackend, image_object_name};
use crate::error::{CivicError, Result};
use crate::types::{
    ImageChange, ImageUpload, Issue, IssueFields, IssueStatus, ProfileUpdate, UserProfile, Vote,
};
use crate::utils::{validate_issue_fields, validate_profile_update};

#[derive(Debug, Default)]
struct MemoryState {
    issues: Vec<Issue>,
    votes: HashSet<Vote>,
    profiles: HashMap<String, UserProfile>,
    images: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    user_id: Option<String>,
}

impl MemoryBackend {
    /// An empty backend with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-loaded with `issues`.
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        let backend = Self::new();
        backend.state.lock().issues = issues;
        backend
    }

    /// Same data, seen by `user_id`.
    pub fn as_user(&self, user_id: impl Into<String>) -> Self {
        Self {
            state: Arc::clone(&self.state),
            user_id: Some(user_id.into()),
        }
    }

    /// Same data, signed out.
    pub fn signed_out(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            user_id: None,
        }
    }

    pub fn insert_profile(&self, profile: UserProfile) {
        self.state.lock().profiles.insert(profile.id.clone(), profile);
    }

    /// Number of stored votes, across all users.
    pub fn vote_count(&self) -> usize {
        self.state.lock().votes.len()
    }

    fn require_user(&self) -> Result<&str> {
        self.user_id.as_deref().ok_or(CivicError::Unauthenticated)
    }

    fn store_image(state: &mut MemoryState, upload: &ImageUpload) -> String {
        let name = image_object_name(upload, Timestamp::now().as_millisecond());
        state.images.insert(name.clone(), upload.bytes.clone());
        format!("memory://{IMAGE_BUCKET}/{name}")
    }
}

fn newest_first(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    issues
}

impl IssueBackend for MemoryBackend {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        let issues = self.state.lock().issues.clone();
        Ok(newest_first(issues))
    }

    async fn get_issue(&self, id: &str) -> Result<Option<Issue>> {
        let state = self.state.lock();
        Ok(state.issues.iter().find(|i| i.id == id).cloned())
    }

    async fn user_issues(&self) -> Result<Vec<Issue>> {
        let user_id = self.require_user()?;
        let issues: Vec<Issue> = self
            .state
            .lock()
            .issues
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(issues))
    }

    async fn create_issue(&self, fields: IssueFields, image: Option<ImageUpload>) -> Result<Issue> {
        let user_id = self.require_user()?.to_string();
        validate_issue_fields(&fields)?;
        let category = fields
            .category
            .ok_or_else(|| CivicError::validation("category", "is required"))?;

        let mut state = self.state.lock();
        let image_url = image.as_ref().map(|u| Self::store_image(&mut state, u));
        let now = Timestamp::now();
        let issue = Issue {
            id: Uuid::new_v4().to_string(),
            title: fields.title.trim().to_string(),
            description: fields.description.trim().to_string(),
            category,
            location: fields.location.trim().to_string(),
            status: IssueStatus::Pending,
            created_at: now,
            updated_at: now,
            user_id,
            image_url,
            votes: 0,
            latitude: fields.latitude,
            longitude: fields.longitude,
        };
        state.issues.push(issue.clone());
        Ok(issue)
    }

    async fn update_issue(
        &self,
        id: &str,
        fields: IssueFields,
        image: ImageChange,
    ) -> Result<Option<Issue>> {
        let user_id = self.require_user()?.to_string();
        validate_issue_fields(&fields)?;

        let mut state = self.state.lock();
        let Some(index) = state
            .issues
            .iter()
            .position(|i| i.id == id && i.user_id == user_id)
        else {
            return Ok(None);
        };
        if state.issues[index].status != IssueStatus::Pending {
            return Err(CivicError::NotEditable(id.to_string()));
        }

        let image_url = match &image {
            ImageChange::Keep => state.issues[index].image_url.clone(),
            ImageChange::Remove => None,
            ImageChange::Replace(upload) => Some(Self::store_image(&mut state, upload)),
        };

        let issue = &mut state.issues[index];
        issue.title = fields.title.trim().to_string();
        issue.description = fields.description.trim().to_string();
        if let Some(category) = fields.category {
            issue.category = category;
        }
        issue.location = fields.location.trim().to_string();
        if let Some(status) = fields.status {
            issue.status = status;
        }
        issue.latitude = fields.latitude;
        issue.longitude = fields.longitude;
        issue.image_url = image_url;
        issue.updated_at = Timestamp::now().max(issue.created_at);
        Ok(Some(issue.clone()))
    }

    async fn delete_issue(&self, id: &str) -> Result<bool> {
        let user_id = self.require_user()?.to_string();
        let mut state = self.state.lock();
        let Some(index) = state
            .issues
            .iter()
            .position(|i| i.id == id && i.user_id == user_id)
        else {
            return Ok(false);
        };
        if state.issues[index].status != IssueStatus::Pending {
            return Err(CivicError::NotEditable(id.to_string()));
        }
        state.issues.remove(index);
        state.votes.retain(|v| v.issue_id != id);
        Ok(true)
    }

    async fn cast_vote(&self, issue_id: &str) -> Result<Issue> {
        let user_id = self.require_user()?.to_string();
        let mut state = self.state.lock();
        let Some(index) = state.issues.iter().position(|i| i.id == issue_id) else {
            return Err(CivicError::NotFound(issue_id.to_string()));
        };

        let vote = Vote {
            issue_id: issue_id.to_string(),
            user_id,
        };
        if !state.votes.insert(vote) {
            return Err(CivicError::AlreadyVoted(issue_id.to_string()));
        }

        let issue = &mut state.issues[index];
        issue.votes += 1;
        Ok(issue.clone())
    }

    async fn has_voted(&self, issue_id: &str) -> Result<bool> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(false);
        };
        let state = self.state.lock();
        Ok(state
            .votes
            .iter()
            .any(|v| v.issue_id == issue_id && v.user_id == user_id))
    }

    async fn voted_issues(&self) -> Result<Vec<Issue>> {
        let user_id = self.require_user()?;
        let state = self.state.lock();
        let voted: HashSet<&str> = state
            .votes
            .iter()
            .filter(|v| v.user_id == user_id)
            .map(|v| v.issue_id.as_str())
            .collect();
        let issues: Vec<Issue> = state
            .issues
            .iter()
            .filter(|i| voted.contains(i.id.as_str()))
            .cloned()
            .collect();
        drop(state);
        Ok(newest_first(issues))
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.state
            .lock()
            .profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| CivicError::NotFound(user_id.to_string()))
    }

    async fn update_own_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let user_id = self.require_user()?.to_string();
        validate_profile_update(&update)?;
        let mut state = self.state.lock();
        let profile = state
            .profiles
            .entry(user_id.clone())
            .or_insert_with(|| UserProfile {
                id: user_id,
                ..Default::default()
            });
        if let Some(name) = update.name {
            profile.name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
        }
        if let Some(bio) = update.bio {
            profile.bio = Some(bio).filter(|b| !b.trim().is_empty());
        }
        Ok(profile.clone())
    }
}
