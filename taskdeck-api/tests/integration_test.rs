/// Integration tests for the TaskDeck API
///
/// These run against a real PostgreSQL database:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/taskdeck_test cargo test -p taskdeck-api -- --ignored
/// ```
///
/// Each test signs in fresh users and deletes them at the end, so the suite
/// can share a database with other runs.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use chrono::{Duration, NaiveDate, Utc};
use common::TestContext;
use serde_json::{json, Value};
use taskdeck_shared::models::calendar_event::CalendarEvent;
use taskdeck_sync::{google::types::ApiEvent, mock::MockCalendarProvider};
use uuid::Uuid;

async fn create_project(ctx: &TestContext, user: &common::TestUser, name: &str) -> Value {
    let (status, body) = ctx
        .request(Method::POST, "/projects", user, Some(json!({ "name": name })))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

async fn create_task(
    ctx: &TestContext,
    user: &common::TestUser,
    project_id: &Value,
    title: &str,
) -> Value {
    let (status, body) = ctx
        .request(
            Method::POST,
            "/tasks",
            user,
            Some(json!({ "projectId": project_id, "title": title })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_session_endpoint_and_signout() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();

    let (status, body) = ctx.request(Method::GET, "/auth/session", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], alice.user.email);
    assert!(body["expires"].is_string());

    let (status, body) = ctx.request(Method::POST, "/auth/signout", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    // The session row is gone
    let (status, _) = ctx.request(Method::GET, "/auth/session", &alice, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_project_crud() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();

    let project = create_project(&ctx, &alice, "Website relaunch").await;
    assert_eq!(project["status"], "ACTIVE");
    assert_eq!(project["color"], "#3B82F6");
    let uri = format!("/projects/{}", project["id"].as_str().unwrap());

    let (status, body) = ctx.request(Method::POST, "/projects", &alice, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, listed) = ctx.request(Method::GET, "/projects", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["_count"]["tasks"], 0);

    let (status, detail) = ctx.request(Method::GET, &uri, &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tasks"], json!([]));

    let (status, updated) = ctx
        .request(Method::PATCH, &uri, &alice, Some(json!({ "status": "COMPLETED" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["status"], "COMPLETED");
    assert_eq!(updated["name"], "Website relaunch");

    let (status, _) = ctx.request(Method::GET, "/projects/not-a-uuid", &alice, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_foreign_resources_are_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();
    let mallory = ctx.sign_in().await.unwrap();

    let project = create_project(&ctx, &alice, "Private").await;
    let task = create_task(&ctx, &alice, &project["id"], "Secret plan").await;
    let project_uri = format!("/projects/{}", project["id"].as_str().unwrap());
    let task_uri = format!("/tasks/{}", task["id"].as_str().unwrap());

    for (method, uri, body) in [
        (Method::GET, &project_uri, None),
        (Method::PATCH, &project_uri, Some(json!({ "name": "Mine now" }))),
        (Method::DELETE, &project_uri, None),
        (Method::GET, &task_uri, None),
        (Method::PATCH, &task_uri, Some(json!({ "status": "DONE" }))),
        (Method::DELETE, &task_uri, None),
    ] {
        let (status, _) = ctx.request(method.clone(), uri, &mallory, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
    }

    // Cannot create a task under someone else's project
    let (status, _) = ctx
        .request(
            Method::POST,
            "/tasks",
            &mallory,
            Some(json!({ "projectId": project["id"], "title": "Sneaky" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Filtering by a foreign project yields nothing
    let (status, body) = ctx
        .request(
            Method::GET,
            &format!("/tasks?projectId={}", project["id"].as_str().unwrap()),
            &mallory,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Nothing changed for the owner
    let (_, detail) = ctx.request(Method::GET, &task_uri, &alice, None).await;
    assert_eq!(detail["status"], "TODO");
    assert_eq!(detail["title"], "Secret plan");

    ctx.cleanup(&alice).await.unwrap();
    ctx.cleanup(&mallory).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_task_defaults_and_required_fields() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();
    let project = create_project(&ctx, &alice, "Docs").await;

    let task = create_task(&ctx, &alice, &project["id"], "Write spec").await;
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["priority"], "MEDIUM");
    assert_eq!(task["actualHours"], 0.0);
    assert_eq!(task["project"]["id"], project["id"]);

    let second = create_task(&ctx, &alice, &project["id"], "Review spec").await;
    assert!(second["order"].as_i64().unwrap() > task["order"].as_i64().unwrap());

    let (status, body) = ctx
        .request(Method::POST, "/tasks", &alice, Some(json!({ "title": "Orphan" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ProjectId and title are required");

    let (status, _) = ctx
        .request(
            Method::POST,
            "/tasks",
            &alice,
            Some(json!({ "projectId": Uuid::new_v4(), "title": "Nowhere" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_task_patch_semantics() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();
    let project = create_project(&ctx, &alice, "Board").await;

    let (status, task) = ctx
        .request(
            Method::POST,
            "/tasks",
            &alice,
            Some(json!({
                "projectId": project["id"],
                "title": "Ship it",
                "description": "Before Friday",
                "dueDate": "2025-03-07",
                "estimatedHours": "4",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", task);
    assert_eq!(task["estimatedHours"], 4.0);
    let uri = format!("/tasks/{}", task["id"].as_str().unwrap());

    // Status only: everything else stays
    let (status, done) = ctx
        .request(Method::PATCH, &uri, &alice, Some(json!({ "status": "DONE" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", done);
    assert_eq!(done["status"], "DONE");
    assert_eq!(done["title"], task["title"]);
    assert_eq!(done["description"], task["description"]);
    assert_eq!(done["dueDate"], task["dueDate"]);
    assert_eq!(done["priority"], task["priority"]);
    assert_eq!(done["order"], task["order"]);

    // null clears nullable fields
    let (_, cleared) = ctx
        .request(
            Method::PATCH,
            &uri,
            &alice,
            Some(json!({ "description": null, "dueDate": null, "estimatedHours": "" })),
        )
        .await;
    assert!(cleared["description"].is_null());
    assert!(cleared["dueDate"].is_null());
    assert!(cleared["estimatedHours"].is_null());
    assert_eq!(cleared["status"], "DONE");

    let (status, _) = ctx
        .request(Method::PATCH, &uri, &alice, Some(json!({ "actualHours": -1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, logged) = ctx
        .request(Method::PATCH, &uri, &alice, Some(json!({ "actualHours": 2.5, "order": 7 })))
        .await;
    assert_eq!(logged["actualHours"], 2.5);
    assert_eq!(logged["order"], 7);

    // Empty body is a no-op
    let (status, same) = ctx.request(Method::PATCH, &uri, &alice, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same["actualHours"], 2.5);

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_oversized_fields_are_bad_requests() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();
    let project = create_project(&ctx, &alice, "Limits").await;
    let task = create_task(&ctx, &alice, &project["id"], "Bounded").await;
    let project_uri = format!("/projects/{}", project["id"].as_str().unwrap());
    let task_uri = format!("/tasks/{}", task["id"].as_str().unwrap());

    for (method, uri, body) in [
        (Method::POST, "/projects", json!({ "name": "P", "color": "rgb(59, 130, 246)" })),
        (Method::PATCH, project_uri.as_str(), json!({ "name": "n".repeat(300) })),
        (Method::PATCH, project_uri.as_str(), json!({ "color": "rgb(59, 130, 246)" })),
        (
            Method::POST,
            "/tasks",
            json!({ "projectId": project["id"], "title": "t".repeat(600) }),
        ),
        (Method::PATCH, task_uri.as_str(), json!({ "title": "t".repeat(600) })),
    ] {
        let (status, response) = ctx.request(method.clone(), uri, &alice, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}: {}", method, uri, response);
    }

    // Nothing was written
    let (_, detail) = ctx.request(Method::GET, &project_uri, &alice, None).await;
    assert_eq!(detail["name"], "Limits");
    assert_eq!(detail["color"], "#3B82F6");
    assert_eq!(detail["tasks"].as_array().unwrap().len(), 1);

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_local_datetime_without_offset_is_utc() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();
    let project = create_project(&ctx, &alice, "Schedule").await;
    let task = create_task(&ctx, &alice, &project["id"], "Kickoff").await;
    let uri = format!("/tasks/{}", task["id"].as_str().unwrap());

    let (status, updated) = ctx
        .request(Method::PATCH, &uri, &alice, Some(json!({ "dueDate": "2025-03-04T09:00:00" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);

    let due: chrono::DateTime<Utc> = updated["dueDate"].as_str().unwrap().parse().unwrap();
    assert_eq!(due, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap().and_utc());

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deletes_cascade_from_project_only() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();
    let project = create_project(&ctx, &alice, "Temporary").await;
    let first = create_task(&ctx, &alice, &project["id"], "One").await;
    let second = create_task(&ctx, &alice, &project["id"], "Two").await;

    let project_uri = format!("/projects/{}", project["id"].as_str().unwrap());
    let first_uri = format!("/tasks/{}", first["id"].as_str().unwrap());
    let second_uri = format!("/tasks/{}", second["id"].as_str().unwrap());

    // Deleting a task keeps its project
    let (status, body) = ctx.request(Method::DELETE, &first_uri, &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    let (status, detail) = ctx.request(Method::GET, &project_uri, &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tasks"].as_array().unwrap().len(), 1);

    // Deleting the project takes the remaining task
    let (status, _) = ctx.request(Method::DELETE, &project_uri, &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.request(Method::GET, &second_uri, &alice, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, tasks) = ctx.request(Method::GET, "/tasks", &alice, None).await;
    assert_eq!(tasks, json!([]));

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_dashboard_counts() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();
    let active = create_project(&ctx, &alice, "Active").await;
    let archived = create_project(&ctx, &alice, "Archived").await;
    ctx.request(
        Method::PATCH,
        &format!("/projects/{}", archived["id"].as_str().unwrap()),
        &alice,
        Some(json!({ "status": "ARCHIVED" })),
    )
    .await;

    let task = create_task(&ctx, &alice, &active["id"], "Done soon").await;
    create_task(&ctx, &alice, &active["id"], "Later").await;
    create_task(&ctx, &alice, &archived["id"], "Old").await;
    ctx.request(
        Method::PATCH,
        &format!("/tasks/{}", task["id"].as_str().unwrap()),
        &alice,
        Some(json!({ "status": "DONE" })),
    )
    .await;

    let (status, dashboard) = ctx.request(Method::GET, "/dashboard", &alice, None).await;
    assert_eq!(status, StatusCode::OK, "{}", dashboard);
    assert_eq!(dashboard["activeProjects"], 1);
    assert_eq!(dashboard["totalTasks"], 3);
    assert_eq!(dashboard["completedTasks"], 1);
    assert_eq!(dashboard["tasksByStatus"]["TODO"], 2);
    assert_eq!(dashboard["tasksByStatus"]["DONE"], 1);
    assert_eq!(dashboard["recentProjects"][0]["name"], "Active");
    assert_eq!(dashboard["recentProjects"][0]["taskCount"], 2);

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_calendar_sync_is_idempotent() {
    let start = Utc::now() - Duration::days(2);
    let provider = Arc::new(MockCalendarProvider::new(vec![
        ApiEvent::timed("evt_standup", "Standup", start, start + Duration::minutes(90)),
        ApiEvent::timed("evt_review", "Review", start + Duration::hours(3), start + Duration::hours(4)),
        ApiEvent::all_day("evt_holiday", "Holiday", NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()),
    ]));

    let ctx = TestContext::new()
        .await
        .unwrap()
        .with_calendar(provider.clone());
    let alice = ctx.sign_in().await.unwrap();

    // No linked Google account yet
    let (status, body) = ctx.request(Method::POST, "/calendar/sync", &alice, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Google account not found. Please log in again.");

    ctx.link_google(&alice).await.unwrap();

    let (status, body) = ctx.request(Method::POST, "/calendar/sync", &alice, None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["syncedCount"], 3);
    assert_eq!(body["message"], "Synced 3 events");

    let first = CalendarEvent::list_for_user(&ctx.db, alice.user.id, Default::default())
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    let standup = first.iter().find(|e| e.google_event_id == "evt_standup").unwrap();
    assert_eq!(standup.duration, 1.5);

    let (status, _) = ctx.request(Method::POST, "/calendar/sync", &alice, None).await;
    assert_eq!(status, StatusCode::OK);

    let second = CalendarEvent::list_for_user(&ctx.db, alice.user.id, Default::default())
        .await
        .unwrap();
    assert_eq!(second.len(), 2);
    for (before, after) in first.iter().zip(&second) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.title, after.title);
        assert_eq!(before.start_time, after.start_time);
        assert_eq!(before.duration, after.duration);
    }
    assert_eq!(provider.calls().len(), 2);
    assert_eq!(provider.calls()[0].0, "ya29.test-access");

    // A renamed upstream event updates the stored row in place
    provider.set_events(vec![ApiEvent::timed(
        "evt_standup",
        "Daily standup",
        start,
        start + Duration::minutes(90),
    )]);
    let (status, _) = ctx.request(Method::POST, "/calendar/sync", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    let third = CalendarEvent::list_for_user(&ctx.db, alice.user.id, Default::default())
        .await
        .unwrap();
    assert_eq!(third.len(), 2);
    let renamed = third.iter().find(|e| e.google_event_id == "evt_standup").unwrap();
    assert_eq!(renamed.id, standup.id);
    assert_eq!(renamed.title, "Daily standup");

    let (status, events) = ctx.request(Method::GET, "/calendar/events", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["title"], "Daily standup");
    assert!(events[0]["task"].is_null());

    let (status, summary) = ctx.request(Method::GET, "/calendar/summary", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["eventCount"], 2);
    assert_eq!(summary["totalHours"], 2.5);

    let (status, _) = ctx
        .request(
            Method::POST,
            "/calendar/sync",
            &alice,
            Some(json!({ "startDate": "2025-03-10", "endDate": "2025-03-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup(&alice).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_debug_account_hides_tokens() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.sign_in().await.unwrap();

    let (status, body) = ctx.request(Method::GET, "/debug/account", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accountExists"], false);
    assert_eq!(body["error"], "Google account not found");
    assert_eq!(body["userId"], alice.user.id.to_string());

    ctx.link_google(&alice).await.unwrap();

    let (status, body) = ctx.request(Method::GET, "/debug/account", &alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accountExists"], true);
    assert_eq!(body["hasAccessToken"], true);
    assert_eq!(body["hasRefreshToken"], true);
    assert!(!body.to_string().contains("ya29.test-access"));

    ctx.cleanup(&alice).await.unwrap();
}
