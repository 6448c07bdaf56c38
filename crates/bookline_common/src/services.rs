// --- File: crates/bookline_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! This module provides trait definitions for the external services the
//! booking flow depends on. The traits allow for dependency injection and
//! easier testing by decoupling the orchestration logic from specific
//! implementations of those services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Errors a calendar backend can surface to its consumers.
///
/// `Unauthorized` is split out from the generic variants because the
/// orchestrator reacts to it (credential invalidation plus a single
/// retry) rather than failing straight away.
#[derive(Error, Debug)]
pub enum CalendarApiError {
    /// The calendar API rejected the presented credential (HTTP 401).
    #[error("calendar authorization rejected")]
    Unauthorized,

    /// The request could not be performed at the transport level.
    #[error("calendar request failed: {0}")]
    Request(String),

    /// The calendar API answered with a non-success status.
    #[error("calendar API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be interpreted.
    #[error("unexpected calendar response: {0}")]
    Response(String),
}

/// A trait for calendar service operations.
///
/// This trait defines the two calendar operations the booking flow needs:
/// checking a window for busy intervals and creating an event carrying a
/// video-conferencing request.
pub trait CalendarService: Send + Sync {
    /// Get busy time intervals within a specified time range.
    #[allow(clippy::type_complexity)]
    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, CalendarApiError>;

    /// Create a calendar event with an attached conferencing request.
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, CalendarApiError>;
}

/// A trait for bearer-credential providers.
///
/// Implementations own their cache internally; consumers only ever
/// `acquire` a usable token or `invalidate` the cached one after the
/// upstream API rejected it.
pub trait TokenProvider: Send + Sync {
    /// Error type returned when no credential can be produced.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return a bearer token, refreshing it if necessary.
    fn acquire(&self) -> BoxFuture<'_, String, Self::Error>;

    /// Drop the cached token so the next `acquire` re-fetches it.
    fn invalidate(&self);
}

/// A trait for notification service operations.
pub trait NotificationService: Send + Sync {
    /// Error type returned by notification service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send an SMS notification.
    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// Data structures for calendar service operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The start time of the event, RFC 3339.
    pub start_time: String,
    /// The end time of the event, RFC 3339.
    pub end_time: String,
    /// IANA timezone name carried alongside both timestamps.
    pub time_zone: String,
    /// The summary or title of the event.
    pub summary: String,
    /// An optional description of the event.
    pub description: Option<String>,
    /// Attendee email addresses.
    pub attendees: Vec<String>,
}

/// Represents the result of a calendar event creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventResult {
    /// The ID of the created event.
    pub event_id: Option<String>,
    /// The video entry-point URI of the attached conference, if any.
    pub meet_link: Option<String>,
    /// The status of the event.
    pub status: String,
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}
