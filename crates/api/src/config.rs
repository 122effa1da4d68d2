//! Process configuration, read once from the environment at startup.

use std::time::Duration;

use thiserror::Error;

use vault_catalog::PhotoPolicy;
use vault_payments::{GatewayConfig, GatewayEnvironment};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(var: &'static str, message: impl Into<String>) -> Self {
        Self {
            var,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub photo_policy: PhotoPolicy,
    /// Request body ceiling for multipart uploads.
    pub max_upload_bytes: usize,
    /// Only used with the `postgres` feature; in-memory stores otherwise.
    pub database_url: Option<String>,
    pub gateway: GatewayConfig,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("photo_policy", &self.photo_policy)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl AppConfig {
    /// In-memory stores, local gateway, optional photos.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: jwt_secret.into(),
            photo_policy: PhotoPolicy::Optional,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            database_url: None,
            gateway: GatewayConfig::local(),
        }
    }

    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let photo_policy = match get("PHOTO_REQUIRED") {
            None => PhotoPolicy::Optional,
            Some(raw) => {
                if parse_flag("PHOTO_REQUIRED", &raw)? {
                    PhotoPolicy::Required
                } else {
                    PhotoPolicy::Optional
                }
            }
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            None => DEFAULT_MAX_UPLOAD_BYTES,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::new("MAX_UPLOAD_BYTES", format!("{e}")))?,
        };

        let environment = match get("GATEWAY_ENVIRONMENT") {
            None => GatewayEnvironment::Local,
            Some(raw) => raw
                .parse::<GatewayEnvironment>()
                .map_err(|e| ConfigError::new("GATEWAY_ENVIRONMENT", e))?,
        };

        let timeout_secs = match get("GATEWAY_TIMEOUT_SECS") {
            None => DEFAULT_GATEWAY_TIMEOUT_SECS,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::new("GATEWAY_TIMEOUT_SECS", format!("{e}")))?,
        };

        let gateway = GatewayConfig {
            environment,
            merchant_id: get("BRAINTREE_MERCHANT_ID").unwrap_or_default(),
            public_key: get("BRAINTREE_PUBLIC_KEY").unwrap_or_default(),
            private_key: get("BRAINTREE_PRIVATE_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            photo_policy,
            max_upload_bytes,
            database_url: get("DATABASE_URL"),
            gateway,
        })
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::new(var, format!("'{other}' is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_to_empty_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.jwt_secret, "dev-secret");
        assert_eq!(config.photo_policy, PhotoPolicy::Optional);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.database_url, None);
        assert_eq!(config.gateway.environment, GatewayEnvironment::Local);
        assert_eq!(config.gateway.timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_gateway_credentials_and_policy() {
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("PHOTO_REQUIRED", "true"),
            ("GATEWAY_ENVIRONMENT", "sandbox"),
            ("BRAINTREE_MERCHANT_ID", "m"),
            ("BRAINTREE_PUBLIC_KEY", "pub"),
            ("BRAINTREE_PRIVATE_KEY", "priv"),
            ("GATEWAY_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.photo_policy, PhotoPolicy::Required);
        assert_eq!(config.gateway.environment, GatewayEnvironment::Sandbox);
        assert!(config.gateway.missing_credentials().is_empty());
        assert_eq!(config.gateway.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(load(&[("PHOTO_REQUIRED", "maybe")]).unwrap_err().var, "PHOTO_REQUIRED");
        assert_eq!(load(&[("MAX_UPLOAD_BYTES", "lots")]).unwrap_err().var, "MAX_UPLOAD_BYTES");
        assert_eq!(
            load(&[("GATEWAY_ENVIRONMENT", "staging")]).unwrap_err().var,
            "GATEWAY_ENVIRONMENT"
        );
    }

    #[test]
    fn debug_hides_secrets() {
        let mut config = AppConfig::local("top-secret");
        config.database_url = Some("postgres://user:pw@host/db".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("pw@host"));
    }
}
