//! Stateless HTTP request builder and response parser for the Clockify API.
//!
//! # Design
//! `ClockifyClient` holds only its `ClientConfig` and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Write operations validate their payload inside `build_*`,
//! so a request that violates a precondition is never produced.
//!
//! Paths are assembled from segments, each percent-encoded, so an id can
//! never change which route a request reaches.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError, PreconditionViolation};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, API_KEY_HEADER};
use crate::types::{
    HydratedTimeEntry, Project, ProjectRequest, Tag, TagRequest, TimeEntry, TimeEntryRequest,
    UpdateTimeEntryRequest, User, Workspace, WorkspaceRequest,
};

const OK: &[u16] = &[200];
const CREATED: &[u16] = &[201, 200];
const DELETED: &[u16] = &[204, 200];

/// Synchronous, stateless client for the Clockify API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. Every request carries the API key header.
#[derive(Debug, Clone)]
pub struct ClockifyClient {
    config: ClientConfig,
}

impl ClockifyClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::from_config(ClientConfig::new(base_url, api_key))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config: ClientConfig::new(&config.base_url, &config.api_key),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // -- users & workspaces ------------------------------------------------

    pub fn build_get_current_user(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &["user"], None, None)
    }

    pub fn build_get_workspaces(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &["workspaces"], None, None)
    }

    pub fn build_create_workspace(
        &self,
        input: &WorkspaceRequest,
    ) -> Result<HttpRequest, ClientError> {
        input.validate()?;
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Post, &["workspaces"], None, Some(body)))
    }

    // -- tags --------------------------------------------------------------

    pub fn build_find_all_tags_on_workspace(&self, workspace_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &["workspaces", workspace_id, "tags"], None, None)
    }

    pub fn build_create_tag(
        &self,
        workspace_id: &str,
        input: &TagRequest,
    ) -> Result<HttpRequest, ClientError> {
        input.validate()?;
        let body = to_json(input)?;
        Ok(self.request(
            HttpMethod::Post,
            &["workspaces", workspace_id, "tags"],
            None,
            Some(body),
        ))
    }

    // -- projects ----------------------------------------------------------

    pub fn build_create_project(
        &self,
        workspace_id: &str,
        input: &ProjectRequest,
    ) -> Result<HttpRequest, ClientError> {
        input.validate()?;
        let body = to_json(input)?;
        Ok(self.request(
            HttpMethod::Post,
            &["workspaces", workspace_id, "projects"],
            None,
            Some(body),
        ))
    }

    pub fn build_delete_project(
        &self,
        workspace_id: &str,
        project_id: &str,
    ) -> Result<HttpRequest, ClientError> {
        require_id("workspace_id", workspace_id)?;
        require_id("project_id", project_id)?;
        Ok(self.request(
            HttpMethod::Delete,
            &["workspaces", workspace_id, "projects", project_id],
            None,
            None,
        ))
    }

    // -- time entries ------------------------------------------------------

    pub fn build_create_time_entry(
        &self,
        workspace_id: &str,
        input: &TimeEntryRequest,
    ) -> Result<HttpRequest, ClientError> {
        input.validate()?;
        let body = to_json(input)?;
        Ok(self.request(
            HttpMethod::Post,
            &["workspaces", workspace_id, "time-entries"],
            None,
            Some(body),
        ))
    }

    pub fn build_get_time_entry(&self, workspace_id: &str, id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["workspaces", workspace_id, "time-entries", id],
            None,
            None,
        )
    }

    /// The payload is checked before the ids, so a missing `start` is
    /// reported even when `id` is also empty.
    pub fn build_update_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
        input: &UpdateTimeEntryRequest,
    ) -> Result<HttpRequest, ClientError> {
        input.validate()?;
        require_id("workspace_id", workspace_id)?;
        require_id("id", id)?;
        let body = to_json(input)?;
        Ok(self.request(
            HttpMethod::Put,
            &["workspaces", workspace_id, "time-entries", id],
            None,
            Some(body),
        ))
    }

    pub fn build_delete_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
    ) -> Result<HttpRequest, ClientError> {
        require_id("workspace_id", workspace_id)?;
        require_id("id", id)?;
        Ok(self.request(
            HttpMethod::Delete,
            &["workspaces", workspace_id, "time-entries", id],
            None,
            None,
        ))
    }

    pub fn build_find_all_time_entries_for_user(
        &self,
        workspace_id: &str,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["workspaces", workspace_id, "user", user_id, "time-entries"],
            Some(window_query(start, end)),
            None,
        )
    }

    pub fn build_find_all_hydrated_time_entries_for_user(
        &self,
        workspace_id: &str,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["workspaces", workspace_id, "user", user_id, "time-entries"],
            Some(format!("{}&hydrated=true", window_query(start, end))),
            None,
        )
    }

    pub fn build_find_all_time_entries_for_project(
        &self,
        workspace_id: &str,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["workspaces", workspace_id, "projects", project_id, "time-entries"],
            Some(window_query(start, end)),
            None,
        )
    }

    // -- parsing -----------------------------------------------------------

    pub fn parse_get_current_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response, OK)?;
        decode(&response)
    }

    pub fn parse_get_workspaces(&self, response: HttpResponse) -> Result<Vec<Workspace>, ApiError> {
        check_status(&response, OK)?;
        decode(&response)
    }

    pub fn parse_create_workspace(&self, response: HttpResponse) -> Result<Workspace, ApiError> {
        check_status(&response, CREATED)?;
        decode(&response)
    }

    pub fn parse_find_all_tags_on_workspace(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Tag>, ApiError> {
        check_status(&response, OK)?;
        decode(&response)
    }

    pub fn parse_create_tag(&self, response: HttpResponse) -> Result<Tag, ApiError> {
        check_status(&response, CREATED)?;
        decode(&response)
    }

    pub fn parse_create_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        check_status(&response, CREATED)?;
        decode(&response)
    }

    pub fn parse_delete_project(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, DELETED)
    }

    pub fn parse_create_time_entry(&self, response: HttpResponse) -> Result<TimeEntry, ApiError> {
        check_status(&response, CREATED)?;
        decode(&response)
    }

    pub fn parse_get_time_entry(&self, response: HttpResponse) -> Result<TimeEntry, ApiError> {
        check_status(&response, OK)?;
        decode(&response)
    }

    pub fn parse_update_time_entry(&self, response: HttpResponse) -> Result<TimeEntry, ApiError> {
        check_status(&response, OK)?;
        decode(&response)
    }

    /// A 404 whose body says the time entry is missing counts as deleted.
    /// Any other 404 (unknown workspace, unmatched route) stays `NotFound`.
    pub fn parse_delete_time_entry(&self, response: HttpResponse) -> Result<(), ApiError> {
        match check_status(&response, DELETED) {
            Err(ApiError::NotFound) if reports_missing_time_entry(&response) => Ok(()),
            other => other,
        }
    }

    pub fn parse_find_all_time_entries(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<TimeEntry>, ApiError> {
        check_status(&response, OK)?;
        decode(&response)
    }

    pub fn parse_find_all_hydrated_time_entries(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<HydratedTimeEntry>, ApiError> {
        check_status(&response, OK)?;
        decode(&response)
    }

    fn request(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: Option<String>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut path = self.config.base_url.clone();
        for segment in segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        if let Some(query) = query {
            path.push('?');
            path.push_str(&query);
        }

        let mut headers = vec![(API_KEY_HEADER.to_string(), self.config.api_key.clone())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

/// Format an instant the way Clockify expects in query strings.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn window_query(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!("start={}&end={}", format_instant(start), format_instant(end))
}

fn require_id(field: &'static str, value: &str) -> Result<(), PreconditionViolation> {
    if value.trim().is_empty() {
        return Err(PreconditionViolation::missing(field));
    }
    Ok(())
}

/// Clockify error payload: `{"message": "...", "code": 404}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn reports_missing_time_entry(response: &HttpResponse) -> bool {
    serde_json::from_str::<ErrorBody>(&response.body)
        .is_ok_and(|body| body.message.to_ascii_lowercase().contains("time entry"))
}

fn to_json<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    match response.status {
        401 | 403 => Err(ApiError::Unauthorized {
            status: response.status,
        }),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
