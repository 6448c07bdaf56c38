// --- File: crates/bookline_booking/src/logic.rs ---
//! The booking orchestrator.
//!
//! One canonical sequence sits behind every wire adapter: validate the
//! request, ensure a credential, check the window for busy intervals,
//! create the event with its Meet link, then send best-effort SMS
//! confirmations. Each step short-circuits with a typed
//! [`BookingError`]; only notification delivery is allowed to fail
//! without failing the booking.

use crate::validation::{validate_booking, RawBookingRequest, ValidatedBooking};
use bookline_common::services::{
    BoxedError, CalendarApiError, CalendarEvent, CalendarService, NotificationService,
    TokenProvider,
};
use bookline_common::BookingError;
use bookline_config::AppConfig;
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Sentinel used when the created event carries no video entry point.
pub const MEET_LINK_UNAVAILABLE: &str = "Non disponible";

const FRENCH_MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Successful booking payload returned to every adapter.
#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingConfirmation {
    pub success: bool,
    pub message: String,
    pub client_name: String,
    pub client_phone: String,
    /// Window start, RFC 3339 in the operating timezone.
    pub start: String,
    /// Window end, RFC 3339 in the operating timezone.
    pub end: String,
    pub meet_link: String,
    /// Whether the client confirmation SMS was accepted for delivery.
    pub sms_sent: bool,
    pub event_id: Option<String>,
}

/// Error payload returned by the REST adapter.
#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingRejection {
    pub success: bool,
    pub message: String,
}

impl BookingRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<&BookingError> for BookingRejection {
    fn from(err: &BookingError) -> Self {
        Self::new(err.to_string())
    }
}

/// Deployment-level settings the orchestrator needs per booking.
#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub calendar_id: String,
    pub time_zone: Tz,
    pub service_name: String,
    pub organizer_email: Option<String>,
    pub operator_phone: Option<String>,
}

impl BookingSettings {
    /// Derives the settings from the loaded configuration.
    ///
    /// Returns `None` when the calendar section or its id is missing,
    /// since no booking can be made without a target calendar.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let gcal = config.gcal.as_ref()?;
        let calendar_id = gcal.calendar_id.clone()?;
        let time_zone = gcal
            .time_zone
            .as_deref()
            .and_then(|name| Tz::from_str(name).ok())
            .unwrap_or(Tz::America__Toronto);
        let booking = config.booking.clone().unwrap_or_default();
        Some(Self {
            calendar_id,
            time_zone,
            service_name: booking
                .service_name
                .unwrap_or_else(|| "Bookline".to_string()),
            organizer_email: booking.organizer_email,
            operator_phone: booking.operator_phone,
        })
    }
}

/// Drives a booking request through the full sequence.
pub struct BookingOrchestrator {
    calendar: Arc<dyn CalendarService>,
    tokens: Arc<dyn TokenProvider<Error = BoxedError>>,
    notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    settings: BookingSettings,
}

impl BookingOrchestrator {
    pub fn new(
        calendar: Arc<dyn CalendarService>,
        tokens: Arc<dyn TokenProvider<Error = BoxedError>>,
        notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
        settings: BookingSettings,
    ) -> Self {
        Self {
            calendar,
            tokens,
            notifier,
            settings,
        }
    }

    /// Books an appointment, or explains why it cannot be booked.
    pub async fn book(
        &self,
        request: RawBookingRequest,
    ) -> Result<BookingConfirmation, BookingError> {
        let now = Utc::now().with_timezone(&self.settings.time_zone);
        let booking = validate_booking(&request, now, self.settings.time_zone)?;
        info!(
            client = %booking.name,
            start = %booking.start.to_rfc3339(),
            "Booking request validated"
        );

        self.tokens.acquire().await.map_err(|e| {
            error!("No usable calendar credential: {e}");
            BookingError::OAuthUnavailable
        })?;

        let start_utc = booking.start.with_timezone(&Utc);
        let end_utc = booking.end.with_timezone(&Utc);
        let busy = self.busy_with_retry(start_utc, end_utc).await?;
        if overlaps(&busy, start_utc, end_utc) {
            info!(start = %booking.start.to_rfc3339(), "Requested slot is busy");
            return Err(BookingError::SlotTaken);
        }

        let created = self
            .calendar
            .create_event(&self.settings.calendar_id, self.event_for(&booking))
            .await
            .map_err(|e| {
                error!("Event creation failed: {e}");
                BookingError::EventCreationFailed
            })?;
        let meet_link = created
            .meet_link
            .unwrap_or_else(|| MEET_LINK_UNAVAILABLE.to_string());

        let sms_sent = self.dispatch_notifications(&booking, &meet_link).await;

        Ok(BookingConfirmation {
            success: true,
            message: confirmation_message(&booking),
            client_name: booking.name.clone(),
            client_phone: booking.phone.clone(),
            start: booking.start.to_rfc3339(),
            end: booking.end.to_rfc3339(),
            meet_link,
            sms_sent,
            event_id: created.event_id,
        })
    }

    /// Free/busy lookup with the single 401-triggered refresh-and-retry.
    async fn busy_with_retry(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, BookingError> {
        match self
            .calendar
            .get_busy_times(&self.settings.calendar_id, start, end)
            .await
        {
            Ok(busy) => Ok(busy),
            Err(CalendarApiError::Unauthorized) => {
                warn!("Calendar rejected the credential, refreshing and retrying once");
                self.tokens.invalidate();
                self.tokens.acquire().await.map_err(|e| {
                    error!("Credential refresh failed: {e}");
                    BookingError::AvailabilityCheckFailed
                })?;
                self.calendar
                    .get_busy_times(&self.settings.calendar_id, start, end)
                    .await
                    .map_err(|e| {
                        error!("Availability check failed after retry: {e}");
                        BookingError::AvailabilityCheckFailed
                    })
            }
            Err(e) => {
                error!("Availability check failed: {e}");
                Err(BookingError::AvailabilityCheckFailed)
            }
        }
    }

    fn event_for(&self, booking: &ValidatedBooking) -> CalendarEvent {
        let mut attendees = Vec::new();
        if let Some(organizer) = &self.settings.organizer_email {
            attendees.push(organizer.clone());
        }
        if let Some(email) = &booking.email {
            attendees.push(email.clone());
        }
        CalendarEvent {
            start_time: booking.start.to_rfc3339(),
            end_time: booking.end.to_rfc3339(),
            time_zone: self.settings.time_zone.name().to_string(),
            summary: format!("Consultation avec {}", booking.name),
            description: Some(event_description(booking)),
            attendees,
        }
    }

    /// Best-effort SMS dispatch. Returns whether the client confirmation
    /// was accepted; the operator copy is fire-and-forget either way.
    async fn dispatch_notifications(&self, booking: &ValidatedBooking, meet_link: &str) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };

        let sent = match notifier
            .send_sms(
                &booking.phone,
                &client_sms_body(booking, &self.settings.service_name, meet_link),
            )
            .await
        {
            Ok(result) => {
                info!(id = %result.id, to = %booking.phone, "Confirmation SMS accepted");
                true
            }
            Err(e) => {
                warn!("Confirmation SMS to {} failed: {e}", booking.phone);
                false
            }
        };

        if let Some(operator) = &self.settings.operator_phone {
            if let Err(e) = notifier
                .send_sms(operator, &operator_sms_body(booking))
                .await
            {
                warn!("Operator copy SMS failed: {e}");
            }
        }

        sent
    }
}

/// True when any busy interval overlaps the half-open window `[start, end)`.
pub(crate) fn overlaps(
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    busy.iter()
        .any(|(busy_start, busy_end)| *busy_start < end && *busy_end > start)
}

/// Formats a date the way the SMS copy expects it, e.g. `27 juin 2025`.
pub(crate) fn format_date_fr(date: &DateTime<Tz>) -> String {
    format!(
        "{} {} {}",
        date.day(),
        FRENCH_MONTHS[date.month0() as usize],
        date.year()
    )
}

fn event_description(booking: &ValidatedBooking) -> String {
    format!(
        "Client: {}\n\
         Téléphone: {}\n\
         Email: {}\n\n\
         📅 Date : {}\n\
         🕒 Heure : {}\n\
         ⏱ Durée : 30 minutes\n\n\
         Le client recevra le lien Google Meet par SMS.",
        booking.name,
        booking.phone,
        booking.email.as_deref().unwrap_or("Non fourni"),
        booking.start.format("%Y-%m-%d"),
        booking.start.format("%H:%M"),
    )
}

fn client_sms_body(booking: &ValidatedBooking, service_name: &str, meet_link: &str) -> String {
    format!(
        "Bonjour {},\n\n\
         Votre rendez-vous avec {} est confirmé!\n\n\
         📅 {}\n\
         🕒 {}\n\
         📍 Vidéoconférence Google Meet\n\n\
         Lien: {}\n\n\
         À bientôt!",
        booking.name,
        service_name,
        format_date_fr(&booking.start),
        booking.start.format("%H:%M"),
        meet_link,
    )
}

fn operator_sms_body(booking: &ValidatedBooking) -> String {
    format!(
        "[COPIE] Nouveau RDV confirmé pour {} - {} - {} {}",
        booking.name,
        booking.phone,
        format_date_fr(&booking.start),
        booking.start.format("%H:%M"),
    )
}

fn confirmation_message(booking: &ValidatedBooking) -> String {
    format!(
        "Rendez-vous confirmé pour {} le {} à {}. Une confirmation sera envoyée au {}.",
        booking.name,
        format_date_fr(&booking.start),
        booking.start.format("%H:%M"),
        booking.phone,
    )
}

#[cfg(test)]
pub(crate) mod message_fixtures {
    use super::*;

    pub(crate) fn sample_booking() -> ValidatedBooking {
        use chrono::TimeZone;
        use chrono_tz::America::Toronto;
        let start = Toronto.with_ymd_and_hms(2025, 6, 27, 14, 0, 0).unwrap();
        ValidatedBooking {
            name: "Jean Dupont".to_string(),
            phone: "+15141234567".to_string(),
            email: None,
            start,
            end: start + chrono::Duration::minutes(30),
        }
    }

    pub(crate) fn description(booking: &ValidatedBooking) -> String {
        event_description(booking)
    }

    pub(crate) fn client_body(
        booking: &ValidatedBooking,
        service_name: &str,
        meet_link: &str,
    ) -> String {
        client_sms_body(booking, service_name, meet_link)
    }

    pub(crate) fn operator_body(booking: &ValidatedBooking) -> String {
        operator_sms_body(booking)
    }

    pub(crate) fn confirmation(booking: &ValidatedBooking) -> String {
        confirmation_message(booking)
    }
}
