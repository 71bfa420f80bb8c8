use std::path::PathBuf;

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions, load_image, print_json};
use crate::backend::IssueBackend;
use crate::display::print_issue_detail;
use crate::error::{CivicError, Result};
use crate::types::{ImageChange, Issue, IssueCategory, IssueFields, IssueStatus};
use crate::utils::validate_issue_fields;
use crate::vote::{VoteCoordinator, VoteState};

/// Issue form fields from the command line. Unset fields keep their current
/// value on edit.
#[derive(Debug, Clone, Default)]
pub struct IssueInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<IssueCategory>,
    pub location: Option<String>,
    pub status: Option<IssueStatus>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<PathBuf>,
    pub remove_image: bool,
}

impl IssueInput {
    fn into_new_fields(self) -> Result<IssueFields> {
        let required = |value: Option<String>, field: &'static str| {
            value.ok_or_else(|| CivicError::validation(field, "is required"))
        };
        let fields = IssueFields {
            title: required(self.title, "title")?,
            description: required(self.description, "description")?,
            category: Some(
                self.category
                    .ok_or_else(|| CivicError::validation("category", "is required"))?,
            ),
            location: required(self.location, "location")?,
            status: None,
            latitude: self.latitude,
            longitude: self.longitude,
        };
        Ok(fields)
    }

    fn merge_into(self, current: &Issue) -> (IssueFields, ImageChange, Option<PathBuf>) {
        let fields = IssueFields {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            category: Some(self.category.unwrap_or(current.category)),
            location: self.location.unwrap_or_else(|| current.location.clone()),
            status: Some(self.status.unwrap_or(current.status)),
            latitude: self.latitude.or(current.latitude),
            longitude: self.longitude.or(current.longitude),
        };
        let change = if self.remove_image {
            ImageChange::Remove
        } else {
            ImageChange::Keep
        };
        (fields, change, self.image)
    }
}

async fn fetch_existing<B: IssueBackend>(backend: &B, id: &str) -> Result<Issue> {
    backend
        .get_issue(id)
        .await?
        .ok_or_else(|| CivicError::NotFound(id.to_string()))
}

/// Client-side owner and pending gate. The backend enforces ownership
/// again on the write itself.
fn ensure_editable<B: IssueBackend>(backend: &B, issue: &Issue) -> Result<()> {
    issue.ensure_editable_by(backend.current_user_id().as_deref())
}

/// Show one issue in full
pub async fn cmd_show<B: IssueBackend>(backend: &B, id: &str, output: OutputOptions) -> Result<()> {
    let issue = fetch_existing(backend, id).await?;
    let voted = backend.has_voted(id).await?;

    if output.json {
        return print_json(&json!({
            "issue": issue,
            "has_voted": voted,
        }));
    }

    let viewer = backend.current_user_id();
    let state = if voted {
        VoteState::Committed
    } else {
        VoteState::Idle
    };
    print_issue_detail(&issue, viewer.as_deref(), state);
    Ok(())
}

/// Report a new issue
pub async fn cmd_report<B: IssueBackend>(
    backend: &B,
    input: IssueInput,
    output: OutputOptions,
) -> Result<()> {
    if backend.current_user_id().is_none() {
        return Err(CivicError::Unauthenticated);
    }
    let image_path = input.image.clone();
    let fields = input.into_new_fields()?;
    validate_issue_fields(&fields)?;
    let image = image_path.as_deref().map(load_image).transpose()?;

    let issue = backend.create_issue(fields, image).await?;
    tracing::debug!(issue_id = %issue.id, "issue reported");

    CommandOutput::new(json!({
        "action": "report",
        "issue": issue,
    }))
    .with_text(format!(
        "Reported {} ({})",
        issue.title.bold(),
        issue.id.cyan()
    ))
    .print(output)
}

/// Edit an issue the viewer reported, while it is still pending
pub async fn cmd_edit<B: IssueBackend>(
    backend: &B,
    id: &str,
    input: IssueInput,
    output: OutputOptions,
) -> Result<()> {
    if input.remove_image && input.image.is_some() {
        return Err(CivicError::validation(
            "image",
            "choose either a new image or removal, not both",
        ));
    }

    let current = fetch_existing(backend, id).await?;
    ensure_editable(backend, &current)?;

    let (fields, mut change, image_path) = input.merge_into(&current);
    validate_issue_fields(&fields)?;
    if let Some(path) = image_path {
        change = ImageChange::Replace(load_image(&path)?);
    }

    let issue = backend
        .update_issue(id, fields, change)
        .await?
        .ok_or_else(|| CivicError::NotFound(id.to_string()))?;

    CommandOutput::new(json!({
        "action": "edit",
        "issue": issue,
    }))
    .with_text(format!("Updated {} ({})", issue.title.bold(), issue.id.cyan()))
    .print(output)
}

/// Delete an issue the viewer reported, while it is still pending
pub async fn cmd_delete<B: IssueBackend>(
    backend: &B,
    id: &str,
    output: OutputOptions,
) -> Result<()> {
    let current = fetch_existing(backend, id).await?;
    ensure_editable(backend, &current)?;

    if !backend.delete_issue(id).await? {
        return Err(CivicError::NotFound(id.to_string()));
    }

    CommandOutput::new(json!({
        "action": "delete",
        "id": id,
        "success": true,
    }))
    .with_text(format!("Deleted {}", current.title.bold()))
    .print(output)
}

/// Add the viewer's vote to an issue
pub async fn cmd_vote<B: IssueBackend>(backend: &B, id: &str, output: OutputOptions) -> Result<()> {
    let current = fetch_existing(backend, id).await?;
    let coordinator = VoteCoordinator::new();
    coordinator.track(id, current.votes, backend.has_voted(id).await?);

    let outcome = coordinator.cast(backend, id).await?;

    let mut text = format!(
        "Voted for {}: now {} vote{}",
        outcome.issue.title.bold(),
        outcome.issue.votes,
        if outcome.issue.votes == 1 { "" } else { "s" }
    );
    if outcome.milestone {
        text.push_str(&format!(
            "\n{}",
            format!("Milestone reached: {} supporters!", outcome.issue.votes).green()
        ));
    }

    CommandOutput::new(json!({
        "action": "vote",
        "issue": outcome.issue,
        "milestone": outcome.milestone,
    }))
    .with_text(text)
    .print(output)
}
