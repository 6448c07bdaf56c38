// --- File: crates/bookline_config/src/lib.rs ---
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;

pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Sources are layered in order: `config/default`, `config/{RUN_ENV}`
/// (both optional, any format the `config` crate understands), then
/// environment variables prefixed with `BOOKLINE` using `__` as the
/// section separator (e.g. `BOOKLINE__SERVER__PORT=9000`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("BOOKLINE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let builder = Config::builder()
        .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
        .add_source(File::with_name(&format!("{config_dir}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("BOOKLINE").separator("__"));

    builder.build()?.try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures the dotenv file is loaded into the process environment exactly once.
///
/// The path defaults to `.env` and can be overridden with `DOTENV_OVERRIDE`.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(!config.use_gcal);
        assert!(!config.use_twilio);
        assert!(config.gcal.is_none());
        assert!(config.twilio.is_none());
    }

    #[test]
    fn test_app_config_sections() {
        let raw = r#"{
            "server": {"host": "127.0.0.1", "port": 9000},
            "use_gcal": true,
            "gcal": {"calendar_id": "primary", "access_token": "ya29.token"},
            "booking": {"service_name": "Autoscale AI"}
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.use_gcal);
        let gcal = config.gcal.unwrap();
        assert_eq!(gcal.calendar_id.as_deref(), Some("primary"));
        assert!(gcal.time_zone.is_none());
        assert_eq!(
            config.booking.unwrap().service_name.as_deref(),
            Some("Autoscale AI")
        );
    }
}
