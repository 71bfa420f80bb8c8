use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions, print_json};
use crate::backend::IssueBackend;
use crate::display::print_profile;
use crate::error::{CivicError, Result};
use crate::types::ProfileUpdate;
use crate::utils::validate_profile_update;

/// Show a profile; the viewer's own when no id is given
pub async fn cmd_profile_show<B: IssueBackend>(
    backend: &B,
    user_id: Option<&str>,
    output: OutputOptions,
) -> Result<()> {
    let user_id = match user_id {
        Some(id) => id.to_string(),
        None => backend.current_user_id().ok_or(CivicError::Unauthenticated)?,
    };
    let profile = backend.get_profile(&user_id).await?;

    if output.json {
        return print_json(&profile);
    }
    print_profile(&profile);
    Ok(())
}

/// Update the viewer's own name and bio
pub async fn cmd_profile_set<B: IssueBackend>(
    backend: &B,
    update: ProfileUpdate,
    output: OutputOptions,
) -> Result<()> {
    if update.is_empty() {
        return Err(CivicError::validation(
            "profile",
            "nothing to update; pass --name or --bio",
        ));
    }
    validate_profile_update(&update)?;
    let profile = backend.update_own_profile(update).await?;

    CommandOutput::new(json!({
        "action": "profile_set",
        "profile": profile,
    }))
    .with_text(format!("Updated profile {}", profile.id.cyan()))
    .print(output)
}
