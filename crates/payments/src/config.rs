//! Gateway credentials and environment, passed explicitly at construction.

use core::str::FromStr;
use std::time::Duration;

/// Which gateway the adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayEnvironment {
    /// In-process gateway for development and tests.
    #[default]
    Local,
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayEnvironment::Local => "local",
            GatewayEnvironment::Sandbox => "sandbox",
            GatewayEnvironment::Production => "production",
        }
    }
}

impl FromStr for GatewayEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(GatewayEnvironment::Local),
            "sandbox" => Ok(GatewayEnvironment::Sandbox),
            "production" => Ok(GatewayEnvironment::Production),
            other => Err(format!(
                "unknown gateway environment '{other}' (expected local, sandbox or production)"
            )),
        }
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub environment: GatewayEnvironment,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,
    /// Transport timeout for remote gateway calls.
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn local() -> Self {
        Self {
            environment: GatewayEnvironment::Local,
            merchant_id: String::new(),
            public_key: String::new(),
            private_key: String::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Names of credentials that are blank.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.merchant_id.trim().is_empty() {
            missing.push("merchant_id");
        }
        if self.public_key.trim().is_empty() {
            missing.push("public_key");
        }
        if self.private_key.trim().is_empty() {
            missing.push("private_key");
        }
        missing
    }
}

impl core::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("environment", &self.environment)
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
