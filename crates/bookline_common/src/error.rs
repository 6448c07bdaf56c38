// --- File: crates/bookline_common/src/error.rs ---
use thiserror::Error;

/// The closed set of reasons a booking request can fail.
///
/// Every variant is terminal and user-visible; none is retried by the
/// service itself (the caller may resubmit). Notification delivery
/// failures are deliberately not part of this taxonomy — they are logged
/// and reduced to a status flag on the success payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// A required request field was absent.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// The start time could not be parsed in any accepted format.
    #[error("Invalid date format")]
    InvalidDateFormat,

    /// The requested start is inside the minimum lead-time window.
    #[error("Trop tôt pour réserver")]
    TooSoon,

    /// The requested start falls outside business hours.
    #[error("En dehors des heures d'ouverture")]
    OutsideHours,

    /// No usable calendar credential could be acquired.
    #[error("OAuth configuration missing")]
    OAuthUnavailable,

    /// The free/busy lookup failed upstream.
    #[error("Availability check failed")]
    AvailabilityCheckFailed,

    /// The requested window overlaps an existing busy interval.
    #[error("Ce créneau est déjà pris")]
    SlotTaken,

    /// The calendar event could not be created upstream.
    #[error("Event creation failed")]
    EventCreationFailed,
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::MissingField(_) => 400,
            BookingError::InvalidDateFormat => 400,
            BookingError::TooSoon => 400,
            BookingError::OutsideHours => 400,
            BookingError::OAuthUnavailable => 500,
            BookingError::AvailabilityCheckFailed => 502,
            // Conflict is the canonical slot-taken signal.
            BookingError::SlotTaken => 409,
            BookingError::EventCreationFailed => 502,
        }
    }
}
