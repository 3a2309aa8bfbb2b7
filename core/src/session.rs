//! One method per remote action, each a single round trip.
//!
//! `ApiSession` pairs a `ClockifyClient` with a `Transport`. Write and delete
//! operations return `Err(PreconditionViolation)` when the payload is missing
//! a mandatory field or an id is empty, before the transport is touched;
//! every other outcome, success or failure, comes back as an `ApiResponse`.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::client::ClockifyClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError, PreconditionViolation};
use crate::http::{HttpRequest, HttpResponse};
use crate::response::ApiResponse;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    HydratedTimeEntry, Project, ProjectRequest, Tag, TagRequest, TimeEntry, TimeEntryRequest,
    UpdateTimeEntryRequest, User, Workspace, WorkspaceRequest,
};

/// Result of a write operation: a local precondition failure, or an envelope.
pub type WriteResult<T> = Result<ApiResponse<T>, PreconditionViolation>;

#[derive(Debug, Clone)]
pub struct ApiSession<T = UreqTransport> {
    client: ClockifyClient,
    transport: T,
}

impl ApiSession<UreqTransport> {
    /// Session over the default blocking transport.
    pub fn connect(config: ClientConfig) -> Self {
        Self::new(ClockifyClient::from_config(config), UreqTransport::new())
    }
}

impl<T: Transport> ApiSession<T> {
    pub fn new(client: ClockifyClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ClockifyClient {
        &self.client
    }

    pub fn get_current_user(&self) -> ApiResponse<User> {
        let request = self.client.build_get_current_user();
        self.dispatch(request, |r| self.client.parse_get_current_user(r))
    }

    pub fn get_workspaces(&self) -> ApiResponse<Vec<Workspace>> {
        let request = self.client.build_get_workspaces();
        self.dispatch(request, |r| self.client.parse_get_workspaces(r))
    }

    pub fn create_workspace(&self, input: &WorkspaceRequest) -> WriteResult<Workspace> {
        let built = self.client.build_create_workspace(input);
        self.call(built, |r| self.client.parse_create_workspace(r))
    }

    pub fn find_all_tags_on_workspace(&self, workspace_id: &str) -> ApiResponse<Vec<Tag>> {
        let request = self.client.build_find_all_tags_on_workspace(workspace_id);
        self.dispatch(request, |r| self.client.parse_find_all_tags_on_workspace(r))
    }

    pub fn create_tag(&self, workspace_id: &str, input: &TagRequest) -> WriteResult<Tag> {
        let built = self.client.build_create_tag(workspace_id, input);
        self.call(built, |r| self.client.parse_create_tag(r))
    }

    pub fn create_project(
        &self,
        workspace_id: &str,
        input: &ProjectRequest,
    ) -> WriteResult<Project> {
        let built = self.client.build_create_project(workspace_id, input);
        self.call(built, |r| self.client.parse_create_project(r))
    }

    pub fn delete_project(&self, workspace_id: &str, project_id: &str) -> WriteResult<()> {
        let built = self.client.build_delete_project(workspace_id, project_id);
        self.call(built, |r| self.client.parse_delete_project(r))
    }

    pub fn create_time_entry(
        &self,
        workspace_id: &str,
        input: &TimeEntryRequest,
    ) -> WriteResult<TimeEntry> {
        let built = self.client.build_create_time_entry(workspace_id, input);
        self.call(built, |r| self.client.parse_create_time_entry(r))
    }

    pub fn get_time_entry(&self, workspace_id: &str, id: &str) -> ApiResponse<TimeEntry> {
        let request = self.client.build_get_time_entry(workspace_id, id);
        self.dispatch(request, |r| self.client.parse_get_time_entry(r))
    }

    pub fn update_time_entry(
        &self,
        workspace_id: &str,
        id: &str,
        input: &UpdateTimeEntryRequest,
    ) -> WriteResult<TimeEntry> {
        let built = self.client.build_update_time_entry(workspace_id, id, input);
        self.call(built, |r| self.client.parse_update_time_entry(r))
    }

    /// An empty id is rejected locally. A 404 reporting the entry as missing
    /// is a success; any other 404 is not.
    pub fn delete_time_entry(&self, workspace_id: &str, id: &str) -> WriteResult<()> {
        let built = self.client.build_delete_time_entry(workspace_id, id);
        self.call(built, |r| self.client.parse_delete_time_entry(r))
    }

    pub fn find_all_time_entries_for_user(
        &self,
        workspace_id: &str,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResponse<Vec<TimeEntry>> {
        let request = self
            .client
            .build_find_all_time_entries_for_user(workspace_id, user_id, start, end);
        self.dispatch(request, |r| self.client.parse_find_all_time_entries(r))
    }

    pub fn find_all_hydrated_time_entries_for_user(
        &self,
        workspace_id: &str,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResponse<Vec<HydratedTimeEntry>> {
        let request = self
            .client
            .build_find_all_hydrated_time_entries_for_user(workspace_id, user_id, start, end);
        self.dispatch(request, |r| self.client.parse_find_all_hydrated_time_entries(r))
    }

    pub fn find_all_time_entries_for_project(
        &self,
        workspace_id: &str,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResponse<Vec<TimeEntry>> {
        let request = self
            .client
            .build_find_all_time_entries_for_project(workspace_id, project_id, start, end);
        self.dispatch(request, |r| self.client.parse_find_all_time_entries(r))
    }

    fn call<R>(
        &self,
        built: Result<HttpRequest, ClientError>,
        parse: impl FnOnce(HttpResponse) -> Result<R, ApiError>,
    ) -> WriteResult<R> {
        match built {
            Ok(request) => Ok(self.dispatch(request, parse)),
            Err(ClientError::Precondition(violation)) => {
                warn!(field = violation.field, "request rejected before dispatch");
                Err(violation)
            }
            Err(ClientError::Api(err)) => {
                warn!(error = %err, "request could not be built");
                Ok(ApiResponse::failure(None, err))
            }
        }
    }

    fn dispatch<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(HttpResponse) -> Result<R, ApiError>,
    ) -> ApiResponse<R> {
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "dispatching request");

        let response = match self.transport.execute(request) {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, %path, error = %err, "transport failed");
                return ApiResponse::failure(None, err);
            }
        };

        let status = response.status;
        match parse(response) {
            Ok(data) => {
                debug!(%method, %path, status, "request succeeded");
                ApiResponse::success(status, data)
            }
            Err(err) => {
                warn!(%method, %path, status, error = %err, "request failed");
                ApiResponse::failure(Some(status), err)
            }
        }
    }
}
