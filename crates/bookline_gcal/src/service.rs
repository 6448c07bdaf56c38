// --- File: crates/bookline_gcal/src/service.rs ---
//! Google Calendar REST client.
//!
//! This module implements the `CalendarService` trait against the Calendar
//! v3 REST API: a `freeBusy` query for availability and an event insert
//! carrying a Google Meet creation request. Authorization is a bearer
//! token obtained from the injected [`TokenProvider`] on every call, so a
//! token refreshed after a 401 is picked up transparently.

use bookline_common::services::{
    BoxFuture, BoxedError, CalendarApiError, CalendarEvent, CalendarEventResult, CalendarService,
    TokenProvider,
};
use bookline_common::HTTP_CLIENT;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Base URL of the Google Calendar v3 API.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Conference solution tag Google expects for Meet links.
const MEET_SOLUTION_TYPE: &str = "hangoutsMeet";

// --- Wire types (Calendar v3) ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest<'a> {
    time_min: String,
    time_max: String,
    time_zone: &'a str,
    items: Vec<FreeBusyItem<'a>>,
}

#[derive(Serialize, Debug)]
struct FreeBusyItem<'a> {
    id: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, CalendarBusy>,
}

#[derive(Deserialize, Debug)]
pub struct CalendarBusy {
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
}

#[derive(Deserialize, Debug)]
pub struct BusyInterval {
    pub start: String,
    pub end: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventPayload<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    start: EventTime<'a>,
    end: EventTime<'a>,
    attendees: Vec<Attendee<'a>>,
    conference_data: ConferenceCreate,
    reminders: Reminders,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: &'a str,
    time_zone: &'a str,
}

#[derive(Serialize, Debug)]
struct Attendee<'a> {
    email: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ConferenceCreate {
    create_request: ConferenceRequest,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ConferenceRequest {
    request_id: String,
    conference_solution_key: ConferenceSolutionKey,
}

#[derive(Serialize, Debug)]
struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Reminders {
    use_default: bool,
    overrides: Vec<ReminderOverride>,
}

#[derive(Serialize, Debug)]
struct ReminderOverride {
    method: &'static str,
    minutes: u32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertedEvent {
    pub id: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub conference_data: Option<ConferenceData>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub entry_point_type: Option<String>,
    pub uri: Option<String>,
}

// --- Client ---

/// Google Calendar client backed by the shared HTTP client.
pub struct GoogleCalendarClient {
    http: Client,
    tokens: Arc<dyn TokenProvider<Error = BoxedError>>,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(tokens: Arc<dyn TokenProvider<Error = BoxedError>>) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            tokens,
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    async fn bearer(&self) -> Result<String, CalendarApiError> {
        self.tokens
            .acquire()
            .await
            .map_err(|e| CalendarApiError::Request(format!("credential acquisition failed: {e}")))
    }

    async fn free_busy(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, CalendarApiError> {
        let token = self.bearer().await?;
        let request = FreeBusyRequest {
            time_min: start_time.to_rfc3339(),
            time_max: end_time.to_rfc3339(),
            time_zone: "UTC",
            items: vec![FreeBusyItem { id: calendar_id }],
        };

        let response = self
            .http
            .post(format!("{}/freeBusy", self.base_url))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| CalendarApiError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CalendarApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| CalendarApiError::Response(e.to_string()))?;
        Ok(busy_periods(&parsed, calendar_id))
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> Result<CalendarEventResult, CalendarApiError> {
        let token = self.bearer().await?;
        let request_id = format!("booking-{}", Uuid::new_v4());
        let payload = event_payload(&event, request_id);

        let url = format!(
            "{}/calendars/{}/events?conferenceDataVersion=1",
            self.base_url, calendar_id
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CalendarApiError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CalendarApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let created: InsertedEvent = response
            .json()
            .await
            .map_err(|e| CalendarApiError::Response(e.to_string()))?;

        let meet_link = created
            .conference_data
            .as_ref()
            .and_then(extract_video_entry_point);
        if meet_link.is_none() {
            warn!("Created event carries no video entry point");
        }
        info!(event_id = ?created.id, "Calendar event created");

        Ok(CalendarEventResult {
            event_id: created.id,
            meet_link,
            status: created.status.unwrap_or_else(|| "confirmed".to_string()),
        })
    }
}

/// Builds the Calendar v3 insert payload for a booking event.
///
/// The conference creation request uses the given per-booking id and the
/// Meet solution tag; reminder overrides are fixed at email-60/popup-30.
pub(crate) fn event_payload(event: &CalendarEvent, request_id: String) -> EventPayload<'_> {
    EventPayload {
        summary: &event.summary,
        description: event.description.as_deref(),
        start: EventTime {
            date_time: &event.start_time,
            time_zone: &event.time_zone,
        },
        end: EventTime {
            date_time: &event.end_time,
            time_zone: &event.time_zone,
        },
        attendees: event
            .attendees
            .iter()
            .map(|email| Attendee { email: email.as_str() })
            .collect(),
        conference_data: ConferenceCreate {
            create_request: ConferenceRequest {
                request_id,
                conference_solution_key: ConferenceSolutionKey {
                    kind: MEET_SOLUTION_TYPE,
                },
            },
        },
        reminders: Reminders {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: "email",
                    minutes: 60,
                },
                ReminderOverride {
                    method: "popup",
                    minutes: 30,
                },
            ],
        },
    }
}

/// Extracts the busy intervals reported for `calendar_id`, sorted by start.
///
/// Intervals with unparseable bounds are skipped rather than failing the
/// whole lookup.
pub fn busy_periods(
    response: &FreeBusyResponse,
    calendar_id: &str,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut periods: Vec<(DateTime<Utc>, DateTime<Utc>)> = response
        .calendars
        .get(calendar_id)
        .map(|calendar| calendar.busy.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(|interval| {
            let start = DateTime::parse_from_rfc3339(&interval.start).ok()?;
            let end = DateTime::parse_from_rfc3339(&interval.end).ok()?;
            Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
        })
        .collect();
    periods.sort_by_key(|(start, _)| *start);
    periods
}

/// Picks the URI of the entry point tagged as the video one.
pub fn extract_video_entry_point(conference: &ConferenceData) -> Option<String> {
    conference
        .entry_points
        .iter()
        .find(|entry| entry.entry_point_type.as_deref() == Some("video"))
        .and_then(|entry| entry.uri.clone())
}

impl CalendarService for GoogleCalendarClient {
    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, CalendarApiError> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move { self.free_busy(&calendar_id, start_time, end_time).await })
    }

    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, CalendarApiError> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move { self.insert_event(&calendar_id, event).await })
    }
}
