//! Command handlers behind the `civicsync` binary.
//!
//! Handlers that talk to the backend are generic over [`IssueBackend`] so
//! the same code runs against the hosted service and the offline demo.

mod analytics;
mod browse;
mod config;
mod geocode;
mod issue;
mod map;
mod profile;

pub use analytics::cmd_analytics;
pub use browse::{BrowseOptions, cmd_browse, cmd_mine, cmd_voted};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use geocode::cmd_geocode;
pub use issue::{IssueInput, cmd_delete, cmd_edit, cmd_report, cmd_show, cmd_vote};
pub use map::{MapOptions, cmd_map};
pub use profile::{cmd_profile_set, cmd_profile_show};

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{CivicError, Result};
use crate::types::ImageUpload;

/// How a command should print its result.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

/// A result with a JSON form and an optional human form.
pub struct CommandOutput {
    json: serde_json::Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: serde_json::Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match (output.json, self.text) {
            (false, Some(text)) => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a photo from disk for upload.
pub fn load_image(path: &Path) -> Result<ImageUpload> {
    let bytes = fs::read(path).map_err(|e| {
        CivicError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read image at {}: {}", path.display(), e),
        ))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CivicError::validation("image", "path has no file name"))?;
    let content_type = image_content_type(path)?;
    Ok(ImageUpload {
        file_name,
        content_type: content_type.to_string(),
        bytes,
    })
}

fn image_content_type(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(CivicError::validation(
            "image",
            "must be a .jpg, .png, .gif or .webp file",
        )),
    }
}
