//! Wire DTOs for the Clockify API.
//!
//! # Design
//! Field names follow Clockify's camelCase JSON contract. These types are
//! defined independently from the mock-server crate; integration tests catch
//! schema drift between the two.
//!
//! Request types keep their mandatory fields as `Option` so that a caller can
//! build a partial request; `validate` enforces the mandatory ones locally
//! before a request is ever built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PreconditionViolation;

/// Start and end of a time entry. `end` is absent while the timer runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// ISO-8601 duration such as `PT1H30M`, present once `end` is set.
    #[serde(default)]
    pub duration: Option<String>,
}

/// A time entry as returned by the API, with bare project and tag ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub user_id: String,
    #[serde(default)]
    pub billable: bool,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub time_interval: TimeInterval,
    pub workspace_id: String,
    #[serde(default)]
    pub is_locked: bool,
}

/// A time entry with its project and tags expanded in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HydratedTimeEntry {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub user_id: String,
    #[serde(default)]
    pub billable: bool,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub project: Option<Project>,
    pub time_interval: TimeInterval,
    pub workspace_id: String,
    #[serde(default)]
    pub is_locked: bool,
}

/// Payload for creating a time entry. `start` is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl TimeEntryRequest {
    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        if self.start.is_none() {
            return Err(PreconditionViolation::missing("start"));
        }
        Ok(())
    }
}

/// Payload for updating a time entry. `start` and `billable` are mandatory
/// when the update is sent; omitted optional fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
}

impl UpdateTimeEntryRequest {
    /// Checks `start` before `billable`, so a request missing both reports `start`.
    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        if self.start.is_none() {
            return Err(PreconditionViolation::missing("start"));
        }
        if self.billable.is_none() {
            return Err(PreconditionViolation::missing("billable"));
        }
        Ok(())
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active_workspace: Option<String>,
    #[serde(default)]
    pub default_workspace: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRequest {
    pub name: String,
}

impl TagRequest {
    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        require_name(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub workspace_id: String,
    #[serde(default)]
    pub billable: bool,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRequest {
    pub name: String,
    /// Hex color such as `#FF00FF`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
}

impl ProjectRequest {
    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        require_name(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceRequest {
    pub name: String,
}

impl WorkspaceRequest {
    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        require_name(&self.name)
    }
}

fn require_name(name: &str) -> Result<(), PreconditionViolation> {
    if name.trim().is_empty() {
        return Err(PreconditionViolation::missing("name"));
    }
    Ok(())
}
