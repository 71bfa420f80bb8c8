//! Application configuration.
//!
//! Stored in `.civicsync/config.yaml` and holds:
//! - Backend endpoint and public API key
//! - The signed-in session, if any
//! - Map provider token and the fallback marker position
//! - Browse and location search tuning
//!
//! Environment variables override the file for the endpoint and every
//! credential, so CI and one-off runs need no file at all.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::backend::Session;
use crate::error::{CivicError, Result};
use crate::geocode::{DEFAULT_DEBOUNCE, DEFAULT_MIN_CHARS};
use crate::map::FALLBACK_POSITION;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::types::{CIVICSYNC_DIR, Coordinates};

pub const ENV_ROOT: &str = "CIVICSYNC_ROOT";
pub const ENV_BACKEND_URL: &str = "CIVICSYNC_BACKEND_URL";
pub const ENV_API_KEY: &str = "CIVICSYNC_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "CIVICSYNC_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "CIVICSYNC_USER_ID";
pub const ENV_MAP_TOKEN: &str = "MAPBOX_TOKEN";

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "backend.url",
    "backend.api_key",
    "session.user_id",
    "session.access_token",
    "map.token",
    "map.fallback_lat",
    "map.fallback_lng",
    "browse.page_size",
    "geocode.debounce_ms",
    "geocode.min_chars",
    "request_timeout",
];

const REDACTED: &str = "[REDACTED]";

/// Directory holding the config file. `CIVICSYNC_ROOT` wins over the
/// working directory's `.civicsync`.
pub fn civicsync_root() -> PathBuf {
    match env::var(ENV_ROOT) {
        Ok(root) if !root.is_empty() => PathBuf::from(root),
        _ => PathBuf::from(CIVICSYNC_DIR),
    }
}

fn env_override(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub browse: BrowseConfig,

    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            session: None,
            map: MapConfig::default(),
            browse: BrowseConfig::default(),
            geocode: GeocodeConfig::default(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Hosted backend endpoint
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_id: String,
    pub access_token: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("user_id", &self.user_id)
            .field("access_token", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_fallback_lat")]
    pub fallback_lat: f64,
    #[serde(default = "default_fallback_lng")]
    pub fallback_lng: f64,
}

fn default_fallback_lat() -> f64 {
    FALLBACK_POSITION.lat
}

fn default_fallback_lng() -> f64 {
    FALLBACK_POSITION.lng
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            token: None,
            fallback_lat: default_fallback_lat(),
            fallback_lng: default_fallback_lng(),
        }
    }
}

impl fmt::Debug for MapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapConfig")
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .field("fallback_lat", &self.fallback_lat)
            .field("fallback_lng", &self.fallback_lng)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    #[serde(default = "default_geocode_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

fn default_geocode_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_geocode_debounce_ms(),
            min_chars: default_min_chars(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CivicError::Config(format!("'{value}' is not a valid number for {key}")))
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CivicError::Config(format!("{key} cannot be empty")));
    }
    Ok(value.to_string())
}

impl Config {
    pub fn config_path() -> PathBuf {
        civicsync_root().join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            CivicError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                CivicError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            CivicError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Holds credentials: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions).map_err(|e| {
                CivicError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to set permissions on config at {}: {}",
                        path.display(),
                        e
                    ),
                ))
            })?;
        }

        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.browse.page_size == 0 {
            return Err(CivicError::Config(
                "browse.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Backend base URL from the environment or the config file
    pub fn backend_url(&self) -> Option<String> {
        env_override(ENV_BACKEND_URL).or_else(|| self.backend.url.clone())
    }

    pub fn api_key(&self) -> Option<SecretString> {
        env_override(ENV_API_KEY)
            .or_else(|| self.backend.api_key.clone())
            .map(SecretString::from)
    }

    /// The signed-in session. Either env var replaces the stored value
    /// for its half; both halves are needed.
    pub fn session(&self) -> Option<Session> {
        let stored = self.session.as_ref();
        let user_id = env_override(ENV_USER_ID).or_else(|| stored.map(|s| s.user_id.clone()))?;
        let token = env_override(ENV_ACCESS_TOKEN).or_else(|| {
            stored
                .map(|s| s.access_token.clone())
                .filter(|t| !t.is_empty())
        })?;
        Some(Session::new(user_id, token))
    }

    pub fn map_token(&self) -> Option<SecretString> {
        env_override(ENV_MAP_TOKEN)
            .or_else(|| self.map.token.clone())
            .map(SecretString::from)
    }

    pub fn fallback_position(&self) -> Coordinates {
        Coordinates::new(self.map.fallback_lat, self.map.fallback_lng)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn geocode_debounce(&self) -> Duration {
        Duration::from_millis(self.geocode.debounce_ms)
    }

    /// Set a value by dotted key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backend.url" => {
                let value = non_empty(key, value)?;
                url::Url::parse(&value)?;
                self.backend.url = Some(value);
            }
            "backend.api_key" => self.backend.api_key = Some(non_empty(key, value)?),
            "session.user_id" => {
                let user_id = non_empty(key, value)?;
                match &mut self.session {
                    Some(session) => session.user_id = user_id,
                    None => {
                        self.session = Some(SessionConfig {
                            user_id,
                            access_token: String::new(),
                        })
                    }
                }
            }
            "session.access_token" => {
                let token = non_empty(key, value)?;
                match &mut self.session {
                    Some(session) => session.access_token = token,
                    None => {
                        return Err(CivicError::Config(
                            "set session.user_id before session.access_token".to_string(),
                        ));
                    }
                }
            }
            "map.token" => self.map.token = Some(non_empty(key, value)?),
            "map.fallback_lat" => {
                let lat: f64 = parse_number(key, value)?;
                crate::utils::validate_coordinates(Some(lat), Some(self.map.fallback_lng))?;
                self.map.fallback_lat = lat;
            }
            "map.fallback_lng" => {
                let lng: f64 = parse_number(key, value)?;
                crate::utils::validate_coordinates(Some(self.map.fallback_lat), Some(lng))?;
                self.map.fallback_lng = lng;
            }
            "browse.page_size" => {
                let size: usize = parse_number(key, value)?;
                if size == 0 {
                    return Err(CivicError::Config(
                        "browse.page_size must be at least 1".to_string(),
                    ));
                }
                self.browse.page_size = size;
            }
            "geocode.debounce_ms" => self.geocode.debounce_ms = parse_number(key, value)?,
            "geocode.min_chars" => self.geocode.min_chars = parse_number(key, value)?,
            "request_timeout" => self.request_timeout = parse_number(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Read a value by dotted key. Credentials come back masked.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mask = |v: &Option<String>| v.as_ref().map(|_| REDACTED.to_string());
        let value = match key {
            "backend.url" => self.backend.url.clone(),
            "backend.api_key" => mask(&self.backend.api_key),
            "session.user_id" => self.session.as_ref().map(|s| s.user_id.clone()),
            "session.access_token" => self.session.as_ref().map(|_| REDACTED.to_string()),
            "map.token" => mask(&self.map.token),
            "map.fallback_lat" => Some(self.map.fallback_lat.to_string()),
            "map.fallback_lng" => Some(self.map.fallback_lng.to_string()),
            "browse.page_size" => Some(self.browse.page_size.to_string()),
            "geocode.debounce_ms" => Some(self.geocode.debounce_ms.to_string()),
            "geocode.min_chars" => Some(self.geocode.min_chars.to_string()),
            "request_timeout" => Some(self.request_timeout.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }
}

fn unknown_key(key: &str) -> CivicError {
    CivicError::Config(format!(
        "unknown config key '{key}' (expected one of: {})",
        CONFIG_KEYS.join(", ")
    ))
}
