use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Deserialize;

mod app_env;

pub use app_env::{app_env, AppEnv};

/// Default email-domain allowlist for the admin-auth wrapper. Overridable
/// via the `ADMIN_DOMAINS` environment variable (comma-separated).
pub const DEFAULT_ADMIN_DOMAINS: &[&str] = &["vitrari.com", "admin.com"];

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// `PORT` — HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// `DB_PATH` — path to the embedded database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// `JWT_SECRET` — key base for signing bearer tokens. Must be overridden in
    /// production; a missing override is refused at startup (see `validate`).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// `LOG_LEVEL` — passed straight to `tracing_subscriber::EnvFilter`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `ADMIN_DOMAINS` — comma-separated email domains allowed through the
    /// admin-auth middleware wrapper.
    #[serde(default = "default_admin_domains")]
    pub admin_domains: String,
    /// `REQUEST_TIMEOUT_SECS` — default per-request wall-clock ceiling.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// `OPTIMIZE_TIMEOUT_SECS` — ceiling for `/api/optimize` and friends.
    #[serde(default = "default_optimize_timeout_secs")]
    pub optimize_timeout_secs: u64,
    /// `CORS_ALLOWED_ORIGINS` — comma-separated list, or `*` for any origin.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,
}

fn default_port() -> u16 {
    9995
}

fn default_db_path() -> String {
    "./database/vitrari.db".to_owned()
}

fn default_jwt_secret() -> String {
    "development-secret-do-not-use-in-production".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_admin_domains() -> String {
    DEFAULT_ADMIN_DOMAINS.join(",")
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_optimize_timeout_secs() -> u64 {
    60
}

fn default_cors_allowed_origins() -> String {
    "*".to_owned()
}

impl Settings {
    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn admin_domain_list(&self) -> Vec<String> {
        self.admin_domains
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn optimize_timeout(&self) -> Duration {
        Duration::from_secs(self.optimize_timeout_secs)
    }

    pub fn cors_allowed_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Refuses to start with the default JWT secret in production.
    pub fn validate(&self) -> anyhow::Result<()> {
        if app_env().is_production() && self.jwt_secret == default_jwt_secret() {
            anyhow::bail!("JWT_SECRET must be overridden in production");
        }
        Ok(())
    }
}

pub fn settings() -> &'static Settings {
    static SETTINGS: OnceCell<Settings> = OnceCell::new();

    SETTINGS.get_or_init(|| load_settings().expect("failed to load settings"))
}

fn load_settings() -> anyhow::Result<Settings> {
    let config = config::Config::builder()
        .add_source(config::Environment::default())
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
