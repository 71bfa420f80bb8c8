//! Hosted backend client over its REST surface.
//!
//! Tables are reached through the row API under `/rest/v1/<table>` with
//! `column=op.value` filters; photos go to the object store under
//! `/storage/v1/object/<bucket>/<name>`. Every request carries the public
//! `apikey` and a bearer token (the session's, or the public key when
//! signed out).
//!
//! The vote counter is bumped by a database trigger on `issue_votes`, and
//! `(issue_id, user_id)` is a unique index there. A unique violation is how
//! a duplicate vote that slipped past the pre-check is reported.

use std::time::Duration;

use jiff::Timestamp;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{IMAGE_BUCKET, IssueBackend, Session, image_object_name};
use crate::error::{CivicError, Result};
use crate::types::{
    ImageChange, ImageUpload, Issue, IssueCategory, IssueFields, IssueStatus, ProfileUpdate,
    UserProfile,
};
use crate::utils::{validate_issue_fields, validate_profile_update};

/// Postgres error code for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Error body returned by the row API.
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewIssueRow<'a> {
    title: &'a str,
    description: &'a str,
    category: IssueCategory,
    location: &'a str,
    status: IssueStatus,
    user_id: &'a str,
    image_url: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
struct IssuePatch<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<IssueCategory>,
    location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<IssueStatus>,
    image_url: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    updated_at: Timestamp,
}

#[derive(Debug, Serialize)]
struct VoteRow<'a> {
    issue_id: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct VotedIssueRow {
    issue_id: String,
}

pub struct RestBackend {
    client: Client,
    base_url: Url,
    api_key: SecretString,
    session: Option<Session>,
}

impl RestBackend {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        session: Option<Session>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            session,
        })
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(CivicError::Unauthenticated)
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("rest/v1/{table}"))?)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|_| CivicError::Config("API key contains invalid characters".to_string()))?;
        let bearer = match &self.session {
            Some(session) => session.bearer(),
            None => format!("Bearer {}", self.api_key.expose_secret()),
        };
        let mut bearer = HeaderValue::from_str(&bearer).map_err(|_| {
            CivicError::Config("access token contains invalid characters".to_string())
        })?;
        bearer.set_sensitive(true);
        headers.insert("apikey", api_key);
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Start a row API request with `filters` as `column=op.value` pairs.
    fn request(
        &self,
        method: Method,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<RequestBuilder> {
        let mut url = self.table_url(table)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (column, condition) in filters {
                pairs.append_pair(column, condition);
            }
        }
        tracing::debug!(%method, table, "backend request");
        Ok(self
            .client
            .request(method, url)
            .headers(self.auth_headers()?))
    }

    /// Send and turn a non-2xx response into a typed error.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<RestErrorBody> = serde_json::from_str(&body).ok();
        let code = parsed.as_ref().and_then(|b| b.code.clone());
        let message = parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::warn!(status = status.as_u16(), code = ?code, "backend request failed: {message}");

        Err(rest_error(status, code.as_deref(), message))
    }

    async fn fetch_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let request = self.request(Method::GET, table, filters)?;
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn fetch_issue(&self, filters: &[(&str, String)]) -> Result<Option<Issue>> {
        let rows: Vec<Issue> = self.fetch_rows("issues", filters).await?;
        Ok(rows.into_iter().next())
    }

    /// Upload a photo and return its public URL.
    async fn upload_image(&self, upload: &ImageUpload) -> Result<String> {
        let name = image_object_name(upload, Timestamp::now().as_millisecond());
        let object_url = self
            .base_url
            .join(&format!("storage/v1/object/{IMAGE_BUCKET}/{name}"))?;
        let request = self
            .client
            .post(object_url)
            .headers(self.auth_headers()?)
            .header(header::CONTENT_TYPE, upload.content_type.as_str())
            .body(upload.bytes.clone());
        self.send(request).await?;

        let public_url = self
            .base_url
            .join(&format!("storage/v1/object/public/{IMAGE_BUCKET}/{name}"))?;
        Ok(public_url.to_string())
    }
}

/// Map a failed row API response onto the error taxonomy.
fn rest_error(status: StatusCode, code: Option<&str>, message: String) -> CivicError {
    if status == StatusCode::UNAUTHORIZED {
        return CivicError::Unauthenticated;
    }
    if status == StatusCode::CONFLICT || code == Some(UNIQUE_VIOLATION) {
        return CivicError::Backend {
            status: StatusCode::CONFLICT.as_u16(),
            message,
        };
    }
    CivicError::Backend {
        status: status.as_u16(),
        message,
    }
}

fn is_conflict(err: &CivicError) -> bool {
    matches!(err, CivicError::Backend { status, .. } if *status == StatusCode::CONFLICT.as_u16())
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

const NEWEST_FIRST: (&str, &str) = ("order", "created_at.desc");

impl IssueBackend for RestBackend {
    fn current_user_id(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.user_id.clone())
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        self.fetch_rows(
            "issues",
            &[
                ("select", "*".to_string()),
                (NEWEST_FIRST.0, NEWEST_FIRST.1.to_string()),
            ],
        )
        .await
    }

    async fn get_issue(&self, id: &str) -> Result<Option<Issue>> {
        self.fetch_issue(&[("select", "*".to_string()), ("id", eq(id))])
            .await
    }

    async fn user_issues(&self) -> Result<Vec<Issue>> {
        let session = self.require_session()?;
        self.fetch_rows(
            "issues",
            &[
                ("select", "*".to_string()),
                ("user_id", eq(&session.user_id)),
                (NEWEST_FIRST.0, NEWEST_FIRST.1.to_string()),
            ],
        )
        .await
    }

    async fn create_issue(&self, fields: IssueFields, image: Option<ImageUpload>) -> Result<Issue> {
        let session = self.require_session()?;
        validate_issue_fields(&fields)?;
        let category = fields
            .category
            .ok_or_else(|| CivicError::validation("category", "is required"))?;

        let image_url = match &image {
            Some(upload) => Some(self.upload_image(upload).await?),
            None => None,
        };

        let row = NewIssueRow {
            title: fields.title.trim(),
            description: fields.description.trim(),
            category,
            location: fields.location.trim(),
            status: IssueStatus::Pending,
            user_id: &session.user_id,
            image_url: image_url.as_deref(),
            latitude: fields.latitude,
            longitude: fields.longitude,
        };
        let request = self
            .request(Method::POST, "issues", &[])?
            .header("Prefer", "return=representation")
            .json(&row);
        let rows: Vec<Issue> = self.send(request).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CivicError::Other("backend returned no row for new issue".to_string()))
    }

    async fn update_issue(
        &self,
        id: &str,
        fields: IssueFields,
        image: ImageChange,
    ) -> Result<Option<Issue>> {
        let session = self.require_session()?;
        validate_issue_fields(&fields)?;

        let owned = [
            ("id", eq(id)),
            ("user_id", eq(&session.user_id)),
        ];
        let Some(existing) = self
            .fetch_issue(&[("select", "*".to_string()), owned[0].clone(), owned[1].clone()])
            .await?
        else {
            return Ok(None);
        };
        if existing.status != IssueStatus::Pending {
            return Err(CivicError::NotEditable(id.to_string()));
        }

        let image_url = match &image {
            ImageChange::Keep => existing.image_url.clone(),
            ImageChange::Remove => None,
            ImageChange::Replace(upload) => Some(self.upload_image(upload).await?),
        };

        let patch = IssuePatch {
            title: fields.title.trim(),
            description: fields.description.trim(),
            category: fields.category,
            location: fields.location.trim(),
            status: fields.status,
            image_url: image_url.as_deref(),
            latitude: fields.latitude,
            longitude: fields.longitude,
            updated_at: Timestamp::now(),
        };
        let request = self
            .request(Method::PATCH, "issues", &owned)?
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows: Vec<Issue> = self.send(request).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_issue(&self, id: &str) -> Result<bool> {
        let session = self.require_session()?;
        let request = self
            .request(
                Method::DELETE,
                "issues",
                &[("id", eq(id)), ("user_id", eq(&session.user_id))],
            )?
            .header("Prefer", "return=representation");
        let rows: Vec<Issue> = self.send(request).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn cast_vote(&self, issue_id: &str) -> Result<Issue> {
        let session = self.require_session()?;
        if self.has_voted(issue_id).await? {
            return Err(CivicError::AlreadyVoted(issue_id.to_string()));
        }

        let request = self.request(Method::POST, "issue_votes", &[])?.json(&VoteRow {
            issue_id,
            user_id: &session.user_id,
        });
        match self.send(request).await {
            Ok(_) => {}
            Err(e) if is_conflict(&e) => {
                return Err(CivicError::AlreadyVoted(issue_id.to_string()));
            }
            Err(e) => return Err(e),
        }

        self.get_issue(issue_id)
            .await?
            .ok_or_else(|| CivicError::NotFound(issue_id.to_string()))
    }

    async fn has_voted(&self, issue_id: &str) -> Result<bool> {
        let Some(session) = &self.session else {
            return Ok(false);
        };
        let rows: Vec<VotedIssueRow> = self
            .fetch_rows(
                "issue_votes",
                &[
                    ("select", "issue_id".to_string()),
                    ("issue_id", eq(issue_id)),
                    ("user_id", eq(&session.user_id)),
                ],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn voted_issues(&self) -> Result<Vec<Issue>> {
        let session = self.require_session()?;
        let votes: Vec<VotedIssueRow> = self
            .fetch_rows(
                "issue_votes",
                &[
                    ("select", "issue_id".to_string()),
                    ("user_id", eq(&session.user_id)),
                ],
            )
            .await?;
        if votes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = votes.iter().map(|v| v.issue_id.as_str()).collect();
        self.fetch_rows(
            "issues",
            &[
                ("select", "*".to_string()),
                ("id", format!("in.({})", ids.join(","))),
                (NEWEST_FIRST.0, NEWEST_FIRST.1.to_string()),
            ],
        )
        .await
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        let rows: Vec<UserProfile> = self
            .fetch_rows(
                "profiles",
                &[
                    ("select", "id,name,email,bio".to_string()),
                    ("id", eq(user_id)),
                ],
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CivicError::NotFound(user_id.to_string()))
    }

    async fn update_own_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let session = self.require_session()?;
        validate_profile_update(&update)?;
        let request = self
            .request(
                Method::PATCH,
                "profiles",
                &[
                    ("id", eq(&session.user_id)),
                    ("select", "id,name,email,bio".to_string()),
                ],
            )?
            .header("Prefer", "return=representation")
            .json(&update);
        let rows: Vec<UserProfile> = self.send(request).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CivicError::NotFound(session.user_id.clone()))
    }
}
