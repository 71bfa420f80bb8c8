//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config get`: Read one value

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::config::Config;
use crate::error::Result;

fn configured(present: bool) -> String {
    if present {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    }
}

/// Show current configuration. Credentials are only reported as present.
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let session = config.session();

    let json_output = json!({
        "backend": {
            "url": config.backend_url(),
            "api_key_configured": config.api_key().is_some(),
        },
        "session": {
            "user_id": session.as_ref().map(|s| s.user_id.clone()),
            "signed_in": session.is_some(),
        },
        "map": {
            "token_configured": config.map_token().is_some(),
            "fallback": config.fallback_position(),
        },
        "browse": config.browse,
        "geocode": config.geocode,
        "request_timeout": config.request_timeout,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text.push_str(&format!("{}:\n", "backend".cyan()));
    match config.backend_url() {
        Some(url) => text.push_str(&format!("  url: {url}\n")),
        None => text.push_str(&format!("  url: {}\n", "not configured".dimmed())),
    }
    text.push_str(&format!("  api_key: {}\n\n", configured(config.api_key().is_some())));

    text.push_str(&format!("{}:\n", "session".cyan()));
    match &session {
        Some(s) => text.push_str(&format!("  signed in as {}\n\n", s.user_id)),
        None => text.push_str(&format!("  {}\n\n", "signed out".dimmed())),
    }

    text.push_str(&format!("{}:\n", "map".cyan()));
    text.push_str(&format!("  token: {}\n", configured(config.map_token().is_some())));
    text.push_str(&format!(
        "  fallback: {}, {}\n\n",
        config.map.fallback_lat, config.map.fallback_lng
    ));

    text.push_str(&format!("{}:\n", "browse".cyan()));
    text.push_str(&format!("  page_size: {}\n\n", config.browse.page_size));

    text.push_str(&format!("{}:\n", "geocode".cyan()));
    text.push_str(&format!("  debounce_ms: {}\n", config.geocode.debounce_ms));
    text.push_str(&format!("  min_chars: {}\n\n", config.geocode.min_chars));

    text.push_str(&format!("request_timeout: {}s\n\n", config.request_timeout));
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "success": true,
    }))
    .with_text(format!("Set {}", key.cyan()))
    .print(output)
}

/// Get a configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;

    let text = match &value {
        Some(v) => v.clone(),
        None => "not set".dimmed().to_string(),
    };
    CommandOutput::new(json!({ "key": key, "value": value }))
        .with_text(text)
        .print(output)
}
