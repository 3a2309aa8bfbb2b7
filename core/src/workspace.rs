//! Resolve a workspace id from a human-readable name.

use tracing::info;

use crate::error::{ApiError, PreconditionViolation};
use crate::session::ApiSession;
use crate::transport::Transport;
use crate::types::WorkspaceRequest;

/// Errors from `create_or_find_workspace`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkspaceSetupError {
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    #[error("workspace lookup failed: {0}")]
    Lookup(ApiError),

    #[error("workspace creation failed: {0}")]
    Create(ApiError),
}

/// Return the id of the workspace called `name`, creating it when absent.
///
/// A blank name is rejected before any request is sent.
pub fn create_or_find_workspace<T: Transport>(
    session: &ApiSession<T>,
    name: &str,
) -> Result<String, WorkspaceSetupError> {
    let request = WorkspaceRequest {
        name: name.to_string(),
    };
    request.validate()?;

    let workspaces = session
        .get_workspaces()
        .into_result()
        .map_err(WorkspaceSetupError::Lookup)?;

    if let Some(existing) = workspaces.into_iter().find(|w| w.name == name) {
        return Ok(existing.id);
    }

    let created = session
        .create_workspace(&request)?
        .into_result()
        .map_err(WorkspaceSetupError::Create)?;
    info!(workspace_id = %created.id, name, "created workspace");
    Ok(created.id)
}
