// --- File: crates/bookline_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// --- Twilio Config ---
// Holds non-secret Twilio config. Secrets loaded via BOOKLINE__TWILIO__* env vars.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwilioConfig {
    pub account_sid: String, // Loaded via BOOKLINE__TWILIO__ACCOUNT_SID
    pub auth_token: String,  // Loaded via BOOKLINE__TWILIO__AUTH_TOKEN
    pub from_number: String, // The sender phone number, E.164
}

// --- Google Calendar Config ---
// Credential material is loaded via BOOKLINE__GCAL__* env vars. Either a
// pre-provisioned access token or the refresh-token triple must be present.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    pub calendar_id: Option<String>, // Mandatory at runtime
    pub time_zone: Option<String>,   // IANA name, defaults to America/Toronto
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

// --- Booking Config ---
// Deployment identity used in event payloads and confirmation messages.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BookingConfig {
    pub service_name: Option<String>,
    pub organizer_email: Option<String>, // Invited to every created event
    pub operator_phone: Option<String>,  // Receives the internal SMS copy
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_twilio: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub booking: Option<BookingConfig>,
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub twilio: Option<TwilioConfig>,
}
