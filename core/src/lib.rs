//! Synchronous client core for the Clockify time-tracking API.
//!
//! # Overview
//! Covers time entries scoped to a workspace (create, get, update, delete,
//! find by user or project over a date window) plus the users, tags,
//! projects and workspaces those flows need.
//!
//! # Design
//! - `ClockifyClient` is stateless: it holds the base URL and API key, builds
//!   `HttpRequest` values and parses `HttpResponse` values without I/O.
//! - `Transport` executes a request; `UreqTransport` is the blocking default.
//! - `ApiSession` runs one round trip per operation and returns an
//!   `ApiResponse` envelope. Write operations check mandatory fields first
//!   and return `PreconditionViolation` without touching the transport.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod session;
pub mod transport;
pub mod types;
pub mod workspace;

pub use client::{format_instant, ClockifyClient};
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, ConfigError, PreconditionViolation};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::ApiResponse;
pub use session::{ApiSession, WriteResult};
pub use transport::{Transport, UreqTransport};
pub use types::{
    HydratedTimeEntry, Project, ProjectRequest, Tag, TagRequest, TimeEntry, TimeEntryRequest,
    TimeInterval, UpdateTimeEntryRequest, User, Workspace, WorkspaceRequest,
};
pub use workspace::{create_or_find_workspace, WorkspaceSetupError};
