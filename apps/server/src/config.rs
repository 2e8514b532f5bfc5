//! Environment-driven configuration.

use datagate_core::credentials::Credentials;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub db_path: String,
    pub direct_plus: Credentials,
    pub onboard: Credentials,
    pub toolkit: Credentials,
    /// Host overrides, for staging endpoints and tests.
    pub direct_plus_base_url: Option<String>,
    pub onboard_base_url: Option<String>,
    pub toolkit_base_url: Option<String>,
}

fn var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8081".to_string()),
            db_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/datagate.db".to_string()),
            direct_plus: Credentials::new(var("DPL_USER"), var("DPL_PASSWORD")),
            onboard: Credentials::new(var("D2O_USER"), var("D2O_PASSWORD")),
            toolkit: Credentials::new(var("DIT_USER"), var("DIT_PASSWORD")),
            direct_plus_base_url: std::env::var("DPL_BASE_URL").ok(),
            onboard_base_url: std::env::var("D2O_BASE_URL").ok(),
            toolkit_base_url: std::env::var("DIT_BASE_URL").ok(),
        }
    }
}
