// --- File: crates/bookline_twilio/src/service.rs ---
use bookline_common::services::{BoxFuture, NotificationResult, NotificationService};
use bookline_common::HTTP_CLIENT;
use bookline_config::TwilioConfig;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

/// Base URL of the Twilio 2010-04-01 REST API.
pub const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio-specific error types.
#[derive(Error, Debug)]
pub enum TwilioError {
    /// Error occurred during a Twilio API request
    #[error("Twilio API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Twilio API
    #[error("Twilio API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },
}

#[derive(Deserialize, Debug)]
struct MessageResource {
    sid: Option<String>,
    status: Option<String>,
}

/// Builds the Messages resource URL for an account.
pub fn messages_url(base: &str, account_sid: &str) -> String {
    format!("{base}/Accounts/{account_sid}/Messages.json")
}

/// Twilio notification service implementation.
///
/// Sends SMS through the Messages resource using basic auth with the
/// account SID and auth token. Callers treat delivery as best-effort;
/// this service only reports, it never retries.
pub struct TwilioNotificationService {
    http: Client,
    config: TwilioConfig,
}

impl TwilioNotificationService {
    /// Create a new Twilio notification service
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            config,
        }
    }
}

impl NotificationService for TwilioNotificationService {
    type Error = TwilioError;

    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, Self::Error> {
        // Clone the values to avoid lifetime issues
        let to = to.to_string();
        let body = body.to_string();

        Box::pin(async move {
            let url = messages_url(TWILIO_API_BASE, &self.config.account_sid);
            let params = [
                ("To", to.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", body.as_str()),
            ];

            info!("Sending SMS to {}", to);
            let response = self
                .http
                .post(&url)
                .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
                .form(&params)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                // Bubble up the Twilio JSON error so the caller can log it
                let message = response.text().await.unwrap_or_default();
                error!("Twilio returned {}: {}", status, message);
                return Err(TwilioError::ApiError {
                    status_code: status.as_u16(),
                    message,
                });
            }

            let message: MessageResource = response.json().await?;
            info!(sid = ?message.sid, "SMS accepted by Twilio");
            Ok(NotificationResult {
                id: message.sid.unwrap_or_default(),
                status: message.status.unwrap_or_else(|| "queued".to_string()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        assert_eq!(
            messages_url(TWILIO_API_BASE, "AC123"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_send_sms_live() {
        // Skip this test outside of a production-like environment with
        // real credentials present.
        if std::env::var("RUN_ENV").unwrap_or_default() != "production" {
            println!("Skipping test_send_sms_live in non-production environment");
            return;
        }

        let config = TwilioConfig {
            account_sid: std::env::var("BOOKLINE__TWILIO__ACCOUNT_SID").unwrap(),
            auth_token: std::env::var("BOOKLINE__TWILIO__AUTH_TOKEN").unwrap(),
            from_number: std::env::var("BOOKLINE__TWILIO__FROM_NUMBER").unwrap(),
        };
        let service = TwilioNotificationService::new(config);
        let result = service.send_sms("+15141234567", "Bookline test message").await;
        assert!(result.is_ok(), "Expected SMS to be accepted: {result:?}");
    }
}
