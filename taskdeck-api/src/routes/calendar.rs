/// Calendar endpoints
///
/// # Endpoints
///
/// - `GET /calendar/events?startDate&endDate` - Imported events in a range
/// - `GET /calendar/summary?startDate&endDate` - Hours per day over the same range
/// - `POST /calendar/sync` - Import events from Google Calendar

use std::collections::{BTreeMap, HashMap};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    input,
    routes::tasks::{with_projects, TaskWithProject},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::session::AuthContext,
    models::{
        calendar_event::{CalendarEvent, EventRange},
        project::Project,
        task::Task,
    },
};
use taskdeck_sync::{sync_calendar_events, SyncWindow};
use uuid::Uuid;

/// Range filter shared by the events and summary endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeQuery {
    pub fn to_range(&self) -> Result<EventRange, ApiError> {
        Ok(EventRange {
            start: input::optional_datetime("startDate", self.start_date.clone())?,
            end: input::optional_datetime("endDate", self.end_date.clone())?,
        })
    }
}

/// An event with its linked task (and that task's project) and project
#[derive(Debug, Serialize)]
pub struct EventWithLinks {
    #[serde(flatten)]
    pub event: CalendarEvent,

    pub task: Option<TaskWithProject>,
    pub project: Option<Project>,
}

/// Hours on one UTC day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub hours: f64,
    pub event_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
    pub event_count: usize,
    pub total_hours: f64,
    pub average_hours_per_event: f64,

    /// Ascending by date
    pub days: Vec<DaySummary>,
}

impl CalendarSummary {
    /// Buckets events by the UTC date they start on
    pub fn from_events(events: &[CalendarEvent]) -> Self {
        let mut days: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();

        for event in events {
            let date = event.start_time.date_naive();
            let day = days.entry(date).or_insert(DaySummary {
                date,
                hours: 0.0,
                event_count: 0,
            });
            day.hours += event.duration;
            day.event_count += 1;
        }

        let total_hours: f64 = events.iter().map(|e| e.duration).sum();
        let average_hours_per_event = if events.is_empty() {
            0.0
        } else {
            total_hours / events.len() as f64
        };

        Self {
            event_count: events.len(),
            total_hours,
            average_hours_per_event,
            days: days.into_values().collect(),
        }
    }
}

/// Optional body of `POST /calendar/sync`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,

    /// Events returned by Google in the window
    pub synced_count: usize,

    pub message: String,
}

/// List the caller's imported events, earliest first
///
/// Matches events with `startTime >= startDate` and `endTime <= endDate`.
pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<EventWithLinks>>> {
    let Query(query) = query?;
    let range = query.to_range()?;

    let events = CalendarEvent::list_for_user(&state.db, auth.user_id, range).await?;

    let mut task_ids: Vec<Uuid> = events.iter().filter_map(|e| e.task_id).collect();
    task_ids.sort_unstable();
    task_ids.dedup();
    let tasks = Task::find_many_for_user(&state.db, &task_ids, auth.user_id).await?;
    let tasks: HashMap<Uuid, TaskWithProject> = with_projects(&state.db, auth.user_id, tasks)
        .await?
        .into_iter()
        .map(|t| (t.task.id, t))
        .collect();

    let mut project_ids: Vec<Uuid> = events.iter().filter_map(|e| e.project_id).collect();
    project_ids.sort_unstable();
    project_ids.dedup();
    let projects: HashMap<Uuid, Project> =
        Project::find_many_for_user(&state.db, &project_ids, auth.user_id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

    let events = events
        .into_iter()
        .map(|event| EventWithLinks {
            task: event.task_id.and_then(|id| tasks.get(&id).cloned()),
            project: event.project_id.and_then(|id| projects.get(&id).cloned()),
            event,
        })
        .collect();

    Ok(Json(events))
}

/// Total and per-day hours over the caller's events in a range
pub async fn summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<CalendarSummary>> {
    let Query(query) = query?;
    let range = query.to_range()?;

    let events = CalendarEvent::list_for_user(&state.db, auth.user_id, range).await?;

    Ok(Json(CalendarSummary::from_events(&events)))
}

/// Import the caller's Google Calendar events
///
/// The body is optional; without it the last 30 days are synced.
///
/// # Errors
///
/// - `400 Bad Request`: malformed body or a start after the end
/// - `500 Internal Server Error`: `{error}` describing what failed
pub async fn sync(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Bytes,
) -> ApiResult<Json<SyncResponse>> {
    let req = parse_sync_request(&body)?;

    let window = SyncWindow::resolve(
        input::optional_datetime("startDate", req.start_date)?,
        input::optional_datetime("endDate", req.end_date)?,
        Utc::now(),
    )?;

    let report = sync_calendar_events(
        &state.db,
        state.oauth.as_ref(),
        state.calendar.as_ref(),
        auth.user_id,
        window,
    )
    .await?;

    Ok(Json(SyncResponse {
        success: true,
        synced_count: report.considered,
        message: format!("Synced {} events", report.considered),
    }))
}

/// Empty bodies mean "use the defaults"
pub fn parse_sync_request(body: &[u8]) -> Result<SyncRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SyncRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn event(start: DateTime<Utc>, hours: f64) -> CalendarEvent {
        CalendarEvent {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            task_id: None,
            project_id: None,
            google_event_id: Uuid::new_v4().to_string(),
            calendar_id: "primary".to_string(),
            title: "Focus".to_string(),
            description: None,
            start_time: start,
            end_time: start + chrono::Duration::minutes((hours * 60.0) as i64),
            duration: hours,
            synced_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_groups_by_start_day() {
        let monday = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        let tuesday = Utc.with_ymd_and_hms(2025, 3, 4, 14, 0, 0).unwrap();
        let events = vec![event(tuesday, 1.0), event(monday, 1.5), event(monday, 0.5)];

        let summary = CalendarSummary::from_events(&events);

        assert_eq!(summary.event_count, 3);
        assert_eq!(summary.total_hours, 3.0);
        assert_eq!(summary.average_hours_per_event, 1.0);
        assert_eq!(
            summary.days,
            vec![
                DaySummary {
                    date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                    hours: 2.0,
                    event_count: 2,
                },
                DaySummary {
                    date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                    hours: 1.0,
                    event_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = CalendarSummary::from_events(&[]);
        assert_eq!(summary.event_count, 0);
        assert_eq!(summary.average_hours_per_event, 0.0);
        assert!(summary.days.is_empty());
    }

    #[test]
    fn test_summary_wire_format() {
        let monday = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        let value = serde_json::to_value(CalendarSummary::from_events(&[event(monday, 1.5)])).unwrap();

        assert_eq!(value["totalHours"], 1.5);
        assert_eq!(value["days"][0]["date"], "2025-03-03");
        assert_eq!(value["days"][0]["eventCount"], 1);
    }

    #[test]
    fn test_sync_body_is_optional() {
        let req = parse_sync_request(b"").unwrap();
        assert!(req.start_date.is_none() && req.end_date.is_none());

        let req = parse_sync_request(br#"{"startDate": "2025-01-01"}"#).unwrap();
        assert_eq!(req.start_date.as_deref(), Some("2025-01-01"));

        assert!(matches!(parse_sync_request(b"{not json"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_range_query_parses_dates() {
        let query = RangeQuery {
            start_date: Some("2025-03-01".to_string()),
            end_date: None,
        };
        let range = query.to_range().unwrap();
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
        assert_eq!(range.end, None);

        let bad = RangeQuery {
            start_date: Some("March".to_string()),
            end_date: None,
        };
        assert!(bad.to_range().is_err());
    }
}
