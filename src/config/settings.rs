//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Signing algorithms accepted for `JWT_ALGORITHM`
pub const SUPPORTED_JWT_ALGORITHMS: &[&str] = &[
    "HS256", "HS384", "HS512", "RS256", "RS384", "RS512", "ES256", "ES384", "PS256", "PS384",
    "PS512", "EdDSA",
];

/// Root configuration structure.
///
/// Every field maps onto an unprefixed environment variable of the same name
/// in upper case (`gateway_port` <- `GATEWAY_PORT`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_host")]
    pub gateway_host: String,
    #[serde(default = "default_port")]
    pub gateway_port: u16,

    #[serde(default, skip_serializing)]
    pub jwt_secret_key: Option<String>,
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,

    #[serde(default = "default_tenant_url")]
    pub tenant_service_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_service_url: String,
    #[serde(default = "default_crm_url")]
    pub crm_service_url: String,
    #[serde(default = "default_document_url")]
    pub document_service_url: String,
    #[serde(default = "default_library_url")]
    pub library_service_url: String,

    #[serde(default = "default_proxy_timeout")]
    pub proxy_timeout_secs: u64,
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
    /// Period of the background health probe, 0 disables it
    #[serde(default)]
    pub health_check_interval_secs: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub rate_limit_enabled: bool,
    #[serde(default = "default_rps")]
    pub rate_limit_rps: u32,
    #[serde(default = "default_burst")]
    pub rate_limit_burst: u32,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_tenant_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_auth_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_crm_url() -> String {
    "http://localhost:8003".to_string()
}

fn default_document_url() -> String {
    "http://localhost:8004".to_string()
}

fn default_library_url() -> String {
    "http://localhost:8005".to_string()
}

fn default_proxy_timeout() -> u64 {
    15
}

fn default_health_timeout() -> u64 {
    5
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8080".to_string(),
        "http://127.0.0.1:8080".to_string(),
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_rps() -> u32 {
    100
}

fn default_burst() -> u32 {
    200
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a `.env` file.
    pub fn load() -> Result<Self> {
        Self::from_environment(Environment::default())
    }

    /// Load settings from an explicit set of variables instead of the process environment
    pub fn load_from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_environment(Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(
                environment
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins"),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.gateway_port == 0 {
            return Err(config_error("GATEWAY_PORT cannot be 0"));
        }

        for (name, url) in self.service_urls() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(config_error(format!(
                    "{} service URL '{}' must start with http:// or https://",
                    name, url
                )));
            }
        }

        if self.proxy_timeout_secs == 0 || self.health_timeout_secs == 0 {
            return Err(config_error("Timeouts must be greater than 0"));
        }

        if !SUPPORTED_JWT_ALGORITHMS.contains(&self.jwt_algorithm.as_str()) {
            return Err(config_error(format!(
                "Unsupported JWT_ALGORITHM '{}'",
                self.jwt_algorithm
            )));
        }

        if self.cors_allowed_origins.iter().any(|o| o.trim() == "*") {
            return Err(config_error(
                "CORS_ALLOWED_ORIGINS cannot contain '*' because credentials are allowed",
            ));
        }

        if self.rate_limit_enabled && (self.rate_limit_rps == 0 || self.rate_limit_burst == 0) {
            return Err(config_error(
                "RATE_LIMIT_RPS and RATE_LIMIT_BURST must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Backend base URLs keyed by service name
    pub fn service_urls(&self) -> [(&'static str, &str); 5] {
        [
            ("tenant", self.tenant_service_url.as_str()),
            ("auth", self.auth_service_url.as_str()),
            ("crm", self.crm_service_url.as_str()),
            ("documents", self.document_service_url.as_str()),
            ("library", self.library_service_url.as_str()),
        ]
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.gateway_host, self.gateway_port)
    }

    pub fn proxy_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Interactive documentation is only served in debug mode
    pub fn docs_enabled(&self) -> bool {
        self.debug
    }

    pub fn log_startup(&self) {
        info!(
            host = %self.gateway_host,
            port = self.gateway_port,
            debug = self.debug,
            "Loaded gateway configuration"
        );
        for (name, url) in self.service_urls() {
            info!(service = name, url = url, "Backend service");
        }
        info!(algorithm = %self.jwt_algorithm, "JWT configuration");
        if self.jwt_secret_key.is_none() {
            warn!("JWT_SECRET_KEY is not set");
        }
    }
}

fn config_error(message: impl Into<String>) -> AppError {
    AppError::Config(config::ConfigError::Message(message.into()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            gateway_host: default_host(),
            gateway_port: default_port(),
            jwt_secret_key: None,
            jwt_algorithm: default_jwt_algorithm(),
            tenant_service_url: default_tenant_url(),
            auth_service_url: default_auth_url(),
            crm_service_url: default_crm_url(),
            document_service_url: default_document_url(),
            library_service_url: default_library_url(),
            proxy_timeout_secs: default_proxy_timeout(),
            health_timeout_secs: default_health_timeout(),
            health_check_interval_secs: 0,
            max_body_bytes: default_max_body_bytes(),
            cors_allowed_origins: default_cors_origins(),
            rate_limit_enabled: false,
            rate_limit_rps: default_rps(),
            rate_limit_burst: default_burst(),
            log_format: default_log_format(),
        }
    }
}
