// --- File: crates/bookline_booking/src/validation.rs ---
//! Request validation and normalization.
//!
//! Everything in this module is a pure function of the raw request and
//! the supplied clock, so the gates are directly unit-testable. No
//! external call happens before a request has passed through here.

use bookline_common::BookingError;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::Deserialize;

/// Appointments are a fixed half-hour window.
pub const SLOT_DURATION_MINUTES: i64 = 30;
/// Minimum notice before an appointment can start.
pub const MIN_LEAD_TIME_HOURS: i64 = 3;
/// First bookable local hour (inclusive).
pub const OPENING_HOUR: u32 = 9;
/// Last bookable local hour (exclusive).
pub const CLOSING_HOUR: u32 = 21;
/// Name used when the caller did not supply one.
pub const DEFAULT_CLIENT_NAME: &str = "Client";

/// Inbound booking request, as posted by the voice-agent platform.
#[derive(Deserialize, Debug, Clone, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawBookingRequest {
    /// Client name, defaults to a placeholder when absent.
    pub name: Option<String>,
    /// Client phone number, required.
    pub phone: Option<String>,
    /// Client email, invited to the event when present.
    pub email: Option<String>,
    /// Requested start, ISO 8601 or `YYYY-MM-DD HH:MM`.
    pub start: Option<String>,
}

/// A request that passed every gate, with the derived appointment window.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Normalizes a phone number towards E.164.
///
/// Separator characters are stripped; a missing `+` is prepended, with a
/// `1` country code assumed when the digits do not already start with
/// one. Digit count is deliberately not validated.
pub fn normalize_phone(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '(' | ')'))
        .collect();
    if cleaned.starts_with('+') {
        cleaned
    } else if cleaned.starts_with('1') {
        format!("+{cleaned}")
    } else {
        format!("+1{cleaned}")
    }
}

/// Parses the requested start into the operating timezone.
///
/// Strings containing a `T` are treated as ISO 8601: an explicit offset
/// (or trailing `Z`) is honored and converted; an offset-less string is
/// interpreted as already local. Without a `T` the fallback format
/// `YYYY-MM-DD HH:MM` is accepted, also local.
pub fn parse_start(raw: &str, time_zone: Tz) -> Result<DateTime<Tz>, BookingError> {
    let raw = raw.trim();
    if raw.contains('T') {
        if has_explicit_offset(raw) {
            return DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&time_zone))
                .map_err(|_| BookingError::InvalidDateFormat);
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .map_err(|_| BookingError::InvalidDateFormat)?;
        return localize(naive, time_zone);
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .map_err(|_| BookingError::InvalidDateFormat)?;
    localize(naive, time_zone)
}

fn has_explicit_offset(raw: &str) -> bool {
    if raw.ends_with('Z') {
        return true;
    }
    // Only look after the date separator; the date itself contains '-'.
    let time_part = &raw[raw.find('T').map(|i| i + 1).unwrap_or(0)..];
    time_part.contains('+') || time_part.contains('-')
}

fn localize(naive: NaiveDateTime, time_zone: Tz) -> Result<DateTime<Tz>, BookingError> {
    // earliest() resolves DST fold ambiguity; a nonexistent local time
    // (spring-forward gap) is rejected.
    time_zone
        .from_local_datetime(&naive)
        .earliest()
        .ok_or(BookingError::InvalidDateFormat)
}

/// Runs the ordered validation gates and derives the appointment window.
///
/// `now` is injected so the lead-time gate is evaluated against the same
/// clock the caller observes.
pub fn validate_booking(
    request: &RawBookingRequest,
    now: DateTime<Tz>,
    time_zone: Tz,
) -> Result<ValidatedBooking, BookingError> {
    let start_raw = request
        .start
        .as_deref()
        .ok_or(BookingError::MissingField("start time"))?;
    let phone_raw = request
        .phone
        .as_deref()
        .ok_or(BookingError::MissingField("client phone number"))?;

    let name = request
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());
    let phone = normalize_phone(phone_raw);
    let start = parse_start(start_raw, time_zone)?;

    if start < now + Duration::hours(MIN_LEAD_TIME_HOURS) {
        return Err(BookingError::TooSoon);
    }
    if !(OPENING_HOUR..CLOSING_HOUR).contains(&start.hour()) {
        return Err(BookingError::OutsideHours);
    }

    let end = start + Duration::minutes(SLOT_DURATION_MINUTES);
    Ok(ValidatedBooking {
        name,
        phone,
        email: request.email.clone(),
        start,
        end,
    })
}
