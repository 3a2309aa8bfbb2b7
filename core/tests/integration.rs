//! Time-entry flows against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port, so state never
//! leaks between tests. Requests travel over real HTTP through
//! `UreqTransport`, exercising request building, header injection and
//! response parsing end to end.

use chrono::{Duration, Utc};
use clockify_core::{
    create_or_find_workspace, ApiError, ApiSession, ClientConfig, ProjectRequest, TagRequest,
    TimeEntryRequest, UpdateTimeEntryRequest,
};
use uuid::Uuid;

const WORKSPACE_NAME: &str = "ClockifyCoreTestWorkspace";

/// Start the mock server on a random port and return its base URL.
fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, mock_server::DEFAULT_API_KEY).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A session plus the id of the test workspace, created on first lookup.
fn setup() -> (ApiSession, String) {
    let base_url = start_mock_server();
    let session = ApiSession::connect(ClientConfig::new(&base_url, mock_server::DEFAULT_API_KEY));
    let workspace_id = create_or_find_workspace(&session, WORKSPACE_NAME).unwrap();
    (session, workspace_id)
}

fn starting_at(start: chrono::DateTime<Utc>) -> TimeEntryRequest {
    TimeEntryRequest {
        start: Some(start),
        ..Default::default()
    }
}

#[test]
fn create_or_find_workspace_reuses_existing() {
    let (session, workspace_id) = setup();
    let again = create_or_find_workspace(&session, WORKSPACE_NAME).unwrap();
    assert_eq!(again, workspace_id);

    let workspaces = session.get_workspaces().into_data().unwrap();
    let matching = workspaces.iter().filter(|w| w.name == WORKSPACE_NAME).count();
    assert_eq!(matching, 1);
}

#[test]
fn find_all_tags_on_workspace_succeeds() {
    let (session, workspace_id) = setup();
    let response = session.find_all_tags_on_workspace(&workspace_id);
    assert!(response.is_successful());
    assert_eq!(response.data().map(Vec::len), Some(0));

    let tag = session
        .create_tag(&workspace_id, &TagRequest { name: "billing".to_string() })
        .unwrap()
        .into_data()
        .unwrap();
    let tags = session.find_all_tags_on_workspace(&workspace_id).into_data().unwrap();
    assert_eq!(tags, vec![tag]);
}

#[test]
fn create_time_entry_echoes_start() {
    let (session, workspace_id) = setup();
    let now = Utc::now();

    let response = session
        .create_time_entry(&workspace_id, &starting_at(now))
        .unwrap();
    assert!(response.is_successful());
    assert_eq!(response.status(), Some(201));

    let created = response.into_data().unwrap();
    assert!(!created.id.is_empty());
    let drift = (created.time_interval.start - now).num_milliseconds().abs();
    assert!(drift < 1000, "start drifted by {drift}ms");
}

#[test]
fn create_time_entry_without_start_is_rejected_locally() {
    let (session, workspace_id) = setup();
    let err = session
        .create_time_entry(&workspace_id, &TimeEntryRequest::default())
        .unwrap_err();
    assert_eq!(err.field, "start");
    assert_eq!(err.to_string(), "value cannot be null (field `start`)");
}

#[test]
fn get_time_entry_matches_created() {
    let (session, workspace_id) = setup();
    let request = TimeEntryRequest {
        description: Some(Uuid::new_v4().to_string()),
        ..starting_at(Utc::now())
    };
    let created = session
        .create_time_entry(&workspace_id, &request)
        .unwrap()
        .into_data()
        .unwrap();

    let fetched = session.get_time_entry(&workspace_id, &created.id);
    assert!(fetched.is_successful());
    assert_eq!(fetched.into_data(), Some(created));
}

#[test]
fn update_time_entry_succeeds() {
    let (session, workspace_id) = setup();
    let now = Utc::now();
    let created = session
        .create_time_entry(&workspace_id, &starting_at(now))
        .unwrap()
        .into_data()
        .unwrap();

    let update = UpdateTimeEntryRequest {
        start: Some(now - Duration::seconds(1)),
        billable: Some(true),
        ..Default::default()
    };
    let response = session
        .update_time_entry(&workspace_id, &created.id, &update)
        .unwrap();
    assert!(response.is_successful());
    assert!(response.data().is_some_and(|entry| entry.billable));
}

#[test]
fn update_time_entry_without_start_is_rejected_locally() {
    let (session, workspace_id) = setup();
    let err = session
        .update_time_entry(&workspace_id, "", &UpdateTimeEntryRequest::default())
        .unwrap_err();
    assert_eq!(err.field, "start");
}

#[test]
fn update_time_entry_without_billable_is_rejected_locally() {
    let (session, workspace_id) = setup();
    let update = UpdateTimeEntryRequest {
        start: Some(Utc::now()),
        billable: None,
        ..Default::default()
    };
    let err = session
        .update_time_entry(&workspace_id, "", &update)
        .unwrap_err();
    assert_eq!(err.field, "billable");
}

#[test]
fn delete_time_entry_removes_it_and_is_idempotent() {
    let (session, workspace_id) = setup();
    let request = TimeEntryRequest {
        description: Some(Uuid::new_v4().to_string()),
        ..starting_at(Utc::now())
    };
    let created = session
        .create_time_entry(&workspace_id, &request)
        .unwrap()
        .into_data()
        .unwrap();

    assert!(session.delete_time_entry(&workspace_id, &created.id).unwrap().is_successful());

    let fetched = session.get_time_entry(&workspace_id, &created.id);
    assert_eq!(fetched.error(), Some(&ApiError::NotFound));

    assert!(session.delete_time_entry(&workspace_id, &created.id).unwrap().is_successful());
}

#[test]
fn delete_in_unknown_workspace_leaves_entry_in_place() {
    let (session, workspace_id) = setup();
    let created = session
        .create_time_entry(&workspace_id, &starting_at(Utc::now()))
        .unwrap()
        .into_data()
        .unwrap();

    let response = session.delete_time_entry("no-such-workspace", &created.id).unwrap();
    assert!(!response.is_successful());
    assert_eq!(response.status(), Some(404));
    assert_eq!(response.error(), Some(&ApiError::NotFound));

    let fetched = session.get_time_entry(&workspace_id, &created.id);
    assert_eq!(fetched.into_data(), Some(created));
}

#[test]
fn delete_with_empty_id_is_rejected_locally() {
    let (session, workspace_id) = setup();
    let err = session.delete_time_entry(&workspace_id, "").unwrap_err();
    assert_eq!(err.field, "id");

    let err = session.delete_project(&workspace_id, "").unwrap_err();
    assert_eq!(err.field, "project_id");
}

#[test]
fn delete_with_slash_in_id_stays_on_its_route() {
    let (session, workspace_id) = setup();
    let created = session
        .create_time_entry(&workspace_id, &starting_at(Utc::now()))
        .unwrap()
        .into_data()
        .unwrap();

    let smuggled = format!("{}/x", created.id);
    let response = session.delete_time_entry(&workspace_id, &smuggled).unwrap();
    assert!(response.is_successful());

    let fetched = session.get_time_entry(&workspace_id, &created.id);
    assert!(fetched.is_successful());
}

#[test]
fn find_all_time_entries_for_user_includes_new_entry() {
    let (session, workspace_id) = setup();
    let request = TimeEntryRequest {
        description: Some(String::new()),
        ..starting_at(Utc::now())
    };
    let created = session
        .create_time_entry(&workspace_id, &request)
        .unwrap()
        .into_data()
        .unwrap();

    let user = session.get_current_user();
    assert!(user.is_successful());
    let user = user.into_data().unwrap();

    let now = Utc::now();
    let response = session.find_all_time_entries_for_user(
        &workspace_id,
        &user.id,
        now - Duration::days(1),
        now + Duration::days(1),
    );
    assert!(response.is_successful());
    assert!(response.into_data().unwrap().contains(&created));
}

#[test]
fn find_all_hydrated_time_entries_for_user_includes_new_entry() {
    let (session, workspace_id) = setup();
    let project = session
        .create_project(
            &workspace_id,
            &ProjectRequest {
                name: format!("Hydrated {}", Uuid::new_v4()),
                color: Some("#00FF00".to_string()),
                billable: None,
            },
        )
        .unwrap()
        .into_data()
        .unwrap();
    let tag = session
        .create_tag(&workspace_id, &TagRequest { name: "hydrated".to_string() })
        .unwrap()
        .into_data()
        .unwrap();
    let request = TimeEntryRequest {
        project_id: Some(project.id.clone()),
        tag_ids: Some(vec![tag.id.clone()]),
        ..starting_at(Utc::now())
    };
    let created = session
        .create_time_entry(&workspace_id, &request)
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(created.tag_ids, vec![tag.id.clone()]);

    let user = session.get_current_user().into_data().unwrap();
    let now = Utc::now();
    let response = session.find_all_hydrated_time_entries_for_user(
        &workspace_id,
        &user.id,
        now - Duration::days(1),
        now + Duration::days(1),
    );
    assert!(response.is_successful());

    let entries = response.into_data().unwrap();
    let hydrated = entries.iter().find(|entry| entry.id == created.id).unwrap();
    assert_eq!(hydrated.project.as_ref(), Some(&project));
    assert_eq!(hydrated.tags, vec![tag]);
}

#[test]
fn find_all_time_entries_for_project_spans_both_windows() {
    let (session, workspace_id) = setup();
    let project = session
        .create_project(
            &workspace_id,
            &ProjectRequest {
                name: format!("FindAllTimeEntriesForProject {}", Uuid::new_v4()),
                color: Some("#FF00FF".to_string()),
                billable: None,
            },
        )
        .unwrap();
    assert!(project.is_successful());
    let project = project.into_data().unwrap();

    let now = Utc::now();
    let first = TimeEntryRequest {
        project_id: Some(project.id.clone()),
        end: Some(now + Duration::minutes(2)),
        description: Some("TimeEntry1".to_string()),
        ..starting_at(now)
    };
    let second = TimeEntryRequest {
        project_id: Some(project.id.clone()),
        end: Some(now + Duration::minutes(3)),
        description: Some("TimeEntry2".to_string()),
        ..starting_at(now - Duration::days(1))
    };
    let first = session
        .create_time_entry(&workspace_id, &first)
        .unwrap()
        .into_data()
        .unwrap();
    let second = session
        .create_time_entry(&workspace_id, &second)
        .unwrap()
        .into_data()
        .unwrap();

    let query_now = Utc::now();
    let response = session.find_all_time_entries_for_project(
        &workspace_id,
        &project.id,
        query_now - Duration::days(1),
        query_now + Duration::days(1),
    );
    let entries = response.into_data().unwrap();
    assert!(entries.iter().any(|entry| entry.id == first.id));
    assert!(entries.iter().any(|entry| entry.id == second.id));

    assert!(session.delete_time_entry(&workspace_id, &first.id).unwrap().is_successful());
    assert!(session.delete_time_entry(&workspace_id, &second.id).unwrap().is_successful());
    assert!(session.delete_project(&workspace_id, &project.id).unwrap().is_successful());
}

#[test]
fn session_is_shared_across_threads() {
    let (session, workspace_id) = setup();
    let ids: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    session
                        .create_time_entry(&workspace_id, &starting_at(Utc::now()))
                        .unwrap()
                        .into_data()
                        .unwrap()
                        .id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for id in &ids {
        assert!(session.get_time_entry(&workspace_id, id).is_successful());
    }
}

#[test]
fn wrong_api_key_is_unauthorized() {
    let base_url = start_mock_server();
    let session = ApiSession::connect(ClientConfig::new(&base_url, "not-the-key"));
    let response = session.get_current_user();
    assert!(!response.is_successful());
    assert_eq!(response.status(), Some(401));
    assert_eq!(response.error(), Some(&ApiError::Unauthorized { status: 401 }));
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = ApiSession::connect(ClientConfig::new(&format!("http://{addr}"), "key"));
    let response = session.get_current_user();
    assert_eq!(response.status(), None);
    assert!(matches!(response.error(), Some(ApiError::TransportError(_))));
}
