//! In-memory stand-in for the slice of the Clockify API the client uses.
//!
//! Every route requires the `X-Api-Key` header to match the key the router
//! was built with. State lives in a single `RwLock`-guarded `Store` seeded
//! with one user and one default workspace.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "mock-api-key";
pub const DEFAULT_WORKSPACE_NAME: &str = "Default Workspace";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub active_workspace: String,
    pub default_workspace: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    pub archived: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub workspace_id: String,
    pub billable: bool,
    pub archived: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub duration: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub description: String,
    pub tag_ids: Vec<String>,
    pub user_id: String,
    pub billable: bool,
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    pub time_interval: TimeInterval,
    pub workspace_id: String,
    pub is_locked: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HydratedTimeEntry {
    pub id: String,
    pub description: String,
    pub tags: Vec<Tag>,
    pub user_id: String,
    pub billable: bool,
    pub task_id: Option<String>,
    pub project: Option<Project>,
    pub time_interval: TimeInterval,
    pub workspace_id: String,
    pub is_locked: bool,
}

#[derive(Deserialize)]
pub struct CreateWorkspace {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateTag {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub color: Option<String>,
    #[serde(default)]
    pub billable: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteTimeEntry {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub billable: Option<bool>,
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub tag_ids: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
pub struct WindowQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hydrated: bool,
}

#[derive(Debug)]
pub struct Store {
    user: User,
    workspaces: Vec<Workspace>,
    tags: HashMap<String, Tag>,
    projects: HashMap<String, Project>,
    entries: HashMap<String, TimeEntry>,
}

impl Store {
    fn seeded() -> Self {
        let workspace = Workspace {
            id: new_id(),
            name: DEFAULT_WORKSPACE_NAME.to_string(),
        };
        let user = User {
            id: new_id(),
            email: "tester@example.com".to_string(),
            name: "Mock Tester".to_string(),
            active_workspace: workspace.id.clone(),
            default_workspace: workspace.id.clone(),
        };
        Self {
            user,
            workspaces: vec![workspace],
            tags: HashMap::new(),
            projects: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    fn require_workspace(&self, workspace_id: &str) -> Result<(), ApiFailure> {
        if self.workspaces.iter().any(|w| w.id == workspace_id) {
            Ok(())
        } else {
            Err(ApiFailure::not_found("workspace"))
        }
    }

    fn hydrate(&self, entry: &TimeEntry) -> HydratedTimeEntry {
        HydratedTimeEntry {
            id: entry.id.clone(),
            description: entry.description.clone(),
            tags: entry
                .tag_ids
                .iter()
                .filter_map(|id| self.tags.get(id).cloned())
                .collect(),
            user_id: entry.user_id.clone(),
            billable: entry.billable,
            task_id: entry.task_id.clone(),
            project: entry
                .project_id
                .as_ref()
                .and_then(|id| self.projects.get(id).cloned()),
            time_interval: entry.time_interval.clone(),
            workspace_id: entry.workspace_id.clone(),
            is_locked: entry.is_locked,
        }
    }

    /// Entries matching `keep` whose interval intersects the window, newest first.
    fn window(&self, query: &WindowQuery, keep: impl Fn(&TimeEntry) -> bool) -> Vec<&TimeEntry> {
        let mut found: Vec<&TimeEntry> = self
            .entries
            .values()
            .filter(|&entry| keep(entry) && overlaps(&entry.time_interval, query))
            .collect();
        found.sort_by(|a, b| b.time_interval.start.cmp(&a.time_interval.start));
        found
    }

    fn render(&self, entries: Vec<&TimeEntry>, hydrated: bool) -> Response {
        if hydrated {
            let entries: Vec<HydratedTimeEntry> =
                entries.into_iter().map(|e| self.hydrate(e)).collect();
            Json(entries).into_response()
        } else {
            let entries: Vec<TimeEntry> = entries.into_iter().cloned().collect();
            Json(entries).into_response()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    api_key: Arc<str>,
}

/// Error body shaped like Clockify's `{"message", "code"}` payload.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} not found"),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "message": self.message,
            "code": self.status.as_u16(),
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::seeded())),
        api_key: Arc::from(api_key),
    };
    Router::new()
        .route("/user", get(get_user))
        .route("/workspaces", get(list_workspaces).post(create_workspace))
        .route("/workspaces/{ws}/tags", get(list_tags).post(create_tag))
        .route("/workspaces/{ws}/projects", post(create_project))
        .route("/workspaces/{ws}/projects/{id}", delete(delete_project))
        .route(
            "/workspaces/{ws}/projects/{id}/time-entries",
            get(project_time_entries),
        )
        .route("/workspaces/{ws}/time-entries", post(create_time_entry))
        .route(
            "/workspaces/{ws}/time-entries/{id}",
            get(get_time_entry).put(update_time_entry).delete(delete_time_entry),
        )
        .route(
            "/workspaces/{ws}/user/{user_id}/time-entries",
            get(user_time_entries),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    if provided != Some(state.api_key.as_ref()) {
        tracing::warn!(
            path = %request.uri().path(),
            "rejected request with missing or wrong api key"
        );
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

async fn get_user(State(state): State<AppState>) -> Json<User> {
    Json(state.db.read().await.user.clone())
}

async fn list_workspaces(State(state): State<AppState>) -> Json<Vec<Workspace>> {
    Json(state.db.read().await.workspaces.clone())
}

async fn create_workspace(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkspace>,
) -> Result<(StatusCode, Json<Workspace>), ApiFailure> {
    let name = non_blank(input.name)?;
    let workspace = Workspace { id: new_id(), name };
    state.db.write().await.workspaces.push(workspace.clone());
    Ok((StatusCode::CREATED, Json(workspace)))
}

async fn list_tags(
    State(state): State<AppState>,
    Path(ws): Path<String>,
) -> Result<Json<Vec<Tag>>, ApiFailure> {
    let store = state.db.read().await;
    store.require_workspace(&ws)?;
    let mut tags: Vec<Tag> = store
        .tags
        .values()
        .filter(|tag| tag.workspace_id == ws)
        .cloned()
        .collect();
    tags.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(tags))
}

async fn create_tag(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Json(input): Json<CreateTag>,
) -> Result<(StatusCode, Json<Tag>), ApiFailure> {
    let mut store = state.db.write().await;
    store.require_workspace(&ws)?;
    let tag = Tag {
        id: new_id(),
        name: non_blank(input.name)?,
        workspace_id: ws,
        archived: false,
    };
    store.tags.insert(tag.id.clone(), tag.clone());
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn create_project(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Json(input): Json<CreateProject>,
) -> Result<(StatusCode, Json<Project>), ApiFailure> {
    let mut store = state.db.write().await;
    store.require_workspace(&ws)?;
    let project = Project {
        id: new_id(),
        name: non_blank(input.name)?,
        color: input.color,
        workspace_id: ws,
        billable: input.billable,
        archived: false,
    };
    store.projects.insert(project.id.clone(), project.clone());
    Ok((StatusCode::CREATED, Json(project)))
}

async fn delete_project(
    State(state): State<AppState>,
    Path((ws, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = state.db.write().await;
    store.require_workspace(&ws)?;
    let owned = store.projects.get(&id).is_some_and(|p| p.workspace_id == ws);
    if !owned {
        return Err(ApiFailure::not_found("project"));
    }
    store.projects.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

async fn create_time_entry(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Json(input): Json<WriteTimeEntry>,
) -> Result<(StatusCode, Json<TimeEntry>), ApiFailure> {
    let start = input.start.ok_or_else(|| ApiFailure::bad_request("start is required"))?;
    let mut store = state.db.write().await;
    store.require_workspace(&ws)?;
    check_references(&store, &ws, input.project_id.as_deref(), input.tag_ids.as_deref())?;

    let entry = TimeEntry {
        id: new_id(),
        description: input.description.unwrap_or_default(),
        tag_ids: input.tag_ids.unwrap_or_default(),
        user_id: store.user.id.clone(),
        billable: input.billable.unwrap_or(false),
        task_id: input.task_id,
        project_id: input.project_id,
        time_interval: interval(start, input.end)?,
        workspace_id: ws,
        is_locked: false,
    };
    store.entries.insert(entry.id.clone(), entry.clone());
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_time_entry(
    State(state): State<AppState>,
    Path((ws, id)): Path<(String, String)>,
) -> Result<Json<TimeEntry>, ApiFailure> {
    let store = state.db.read().await;
    store.require_workspace(&ws)?;
    store
        .entries
        .get(&id)
        .filter(|entry| entry.workspace_id == ws)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("time entry"))
}

/// Replaces start and billable; other fields change only when present.
async fn update_time_entry(
    State(state): State<AppState>,
    Path((ws, id)): Path<(String, String)>,
    Json(input): Json<WriteTimeEntry>,
) -> Result<Json<TimeEntry>, ApiFailure> {
    let start = input.start.ok_or_else(|| ApiFailure::bad_request("start is required"))?;
    let billable = input
        .billable
        .ok_or_else(|| ApiFailure::bad_request("billable is required"))?;

    let mut store = state.db.write().await;
    store.require_workspace(&ws)?;
    check_references(&store, &ws, input.project_id.as_deref(), input.tag_ids.as_deref())?;
    let entry = store
        .entries
        .get_mut(&id)
        .filter(|entry| entry.workspace_id == ws)
        .ok_or_else(|| ApiFailure::not_found("time entry"))?;

    let end = input.end.or(entry.time_interval.end);
    entry.time_interval = interval(start, end)?;
    entry.billable = billable;
    if let Some(description) = input.description {
        entry.description = description;
    }
    if let Some(project_id) = input.project_id {
        entry.project_id = Some(project_id);
    }
    if let Some(task_id) = input.task_id {
        entry.task_id = Some(task_id);
    }
    if let Some(tag_ids) = input.tag_ids {
        entry.tag_ids = tag_ids;
    }
    Ok(Json(entry.clone()))
}

async fn delete_time_entry(
    State(state): State<AppState>,
    Path((ws, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = state.db.write().await;
    store.require_workspace(&ws)?;
    let owned = store.entries.get(&id).is_some_and(|e| e.workspace_id == ws);
    if !owned {
        return Err(ApiFailure::not_found("time entry"));
    }
    store.entries.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

async fn user_time_entries(
    State(state): State<AppState>,
    Path((ws, user_id)): Path<(String, String)>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiFailure> {
    let store = state.db.read().await;
    store.require_workspace(&ws)?;
    let entries = store.window(&query, |entry| {
        entry.workspace_id == ws && entry.user_id == user_id
    });
    Ok(store.render(entries, query.hydrated))
}

async fn project_time_entries(
    State(state): State<AppState>,
    Path((ws, project_id)): Path<(String, String)>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiFailure> {
    let store = state.db.read().await;
    store.require_workspace(&ws)?;
    if !store.projects.contains_key(&project_id) {
        return Err(ApiFailure::not_found("project"));
    }
    let entries = store.window(&query, |entry| {
        entry.workspace_id == ws && entry.project_id.as_deref() == Some(project_id.as_str())
    });
    Ok(store.render(entries, query.hydrated))
}

fn check_references(
    store: &Store,
    ws: &str,
    project_id: Option<&str>,
    tag_ids: Option<&[String]>,
) -> Result<(), ApiFailure> {
    if let Some(project_id) = project_id {
        let known = store
            .projects
            .get(project_id)
            .is_some_and(|project| project.workspace_id == ws);
        if !known {
            return Err(ApiFailure::bad_request(format!("unknown project {project_id}")));
        }
    }
    for tag_id in tag_ids.unwrap_or_default() {
        let known = store.tags.get(tag_id).is_some_and(|tag| tag.workspace_id == ws);
        if !known {
            return Err(ApiFailure::bad_request(format!("unknown tag {tag_id}")));
        }
    }
    Ok(())
}

/// Build an interval truncated to whole seconds, as Clockify stores it.
fn interval(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<TimeInterval, ApiFailure> {
    let start = whole_seconds(start);
    let end = end.map(whole_seconds);
    if let Some(end) = end {
        if end < start {
            return Err(ApiFailure::bad_request("end must not be before start"));
        }
    }
    Ok(TimeInterval {
        start,
        end,
        duration: end.map(|end| iso_duration(end - start)),
    })
}

/// A running entry (no end) extends indefinitely.
fn overlaps(interval: &TimeInterval, query: &WindowQuery) -> bool {
    let starts_before_window_end = query.end.is_none_or(|end| interval.start <= end);
    let ends_after_window_start = match (interval.end, query.start) {
        (Some(entry_end), Some(start)) => entry_end >= start,
        _ => true,
    };
    starts_before_window_end && ends_after_window_start
}

fn whole_seconds(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.with_nanosecond(0).unwrap_or(instant)
}

pub fn iso_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if total == 0 {
        return "PT0S".to_string();
    }
    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if seconds > 0 {
        out.push_str(&format!("{seconds}S"));
    }
    out
}

fn non_blank(name: String) -> Result<String, ApiFailure> {
    if name.trim().is_empty() {
        return Err(ApiFailure::bad_request("name must not be empty"));
    }
    Ok(name)
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
