// --- File: crates/services/bookline_backend/src/service_factory.rs ---
//! Service wiring for the backend binary.
//!
//! Builds the concrete calendar, credential and notification services
//! from the loaded configuration and injects them into the booking
//! orchestrator. Concrete service errors are erased to `BoxedError`
//! here so the orchestrator can hold plain trait objects.

use bookline_booking::handlers::BookingState;
use bookline_booking::logic::{BookingOrchestrator, BookingSettings};
use bookline_common::services::{
    BoxFuture, BoxedError, NotificationResult, NotificationService, TokenProvider,
};
use bookline_config::AppConfig;
use bookline_gcal::auth::GoogleTokenProvider;
use bookline_gcal::service::GoogleCalendarClient;
use bookline_twilio::service::TwilioNotificationService;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Erases the concrete token-provider error type.
struct BoxedTokenProvider {
    inner: GoogleTokenProvider,
}

impl TokenProvider for BoxedTokenProvider {
    type Error = BoxedError;

    fn acquire(&self) -> BoxFuture<'_, String, Self::Error> {
        Box::pin(async move {
            self.inner
                .acquire_token()
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn invalidate(&self) {
        self.inner.invalidate_token();
    }
}

/// Erases the concrete notification-service error type.
struct BoxedNotificationService {
    inner: TwilioNotificationService,
}

impl NotificationService for BoxedNotificationService {
    type Error = BoxedError;

    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let body = body.to_string();
        Box::pin(async move {
            self.inner
                .send_sms(&to, &body)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}

/// Builds the booking state, or `None` when the calendar section is too
/// incomplete for any booking to succeed.
pub fn build_booking_state(config: Arc<AppConfig>) -> Option<Arc<BookingState>> {
    let Some(settings) = BookingSettings::from_config(&config) else {
        error!("🚨 GCal configuration or calendar_id missing. Booking routes disabled.");
        return None;
    };
    let Some(gcal_config) = config.gcal.as_ref() else {
        return None;
    };

    info!("ℹ️ Initializing Google Calendar service...");
    let provider = GoogleTokenProvider::new(gcal_config);
    if !provider.is_configured() {
        // Requests will still be validated, then fail with a 5xx at the
        // credential step.
        warn!("⚠️ No Google credential configured; bookings will fail until one is provided.");
    }
    let tokens: Arc<dyn TokenProvider<Error = BoxedError>> =
        Arc::new(BoxedTokenProvider { inner: provider });
    let calendar = Arc::new(GoogleCalendarClient::new(tokens.clone()));
    info!("✅ Google Calendar service initialized.");

    let notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>> = if config.use_twilio {
        match config.twilio.clone() {
            Some(twilio_config) => {
                info!("ℹ️ Initializing Twilio notification service...");
                Some(Arc::new(BoxedNotificationService {
                    inner: TwilioNotificationService::new(twilio_config),
                }))
            }
            None => {
                warn!("⚠️ use_twilio is set but the twilio config section is missing.");
                None
            }
        }
    } else {
        info!("ℹ️ Twilio disabled; confirmations will not be sent by SMS.");
        None
    };

    let orchestrator = Arc::new(BookingOrchestrator::new(
        calendar,
        tokens,
        notifier,
        settings,
    ));
    Some(Arc::new(BookingState {
        config,
        orchestrator,
    }))
}
