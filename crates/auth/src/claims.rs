use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vault_core::UserId;

use crate::Role;

/// Claims a signed-in caller presents. Timestamps are seconds since epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    #[serde(default)]
    pub role: Role,

    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: UserId, role: Role, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub,
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token could not be decoded: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Check the time window of already-decoded claims.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_around(now: DateTime<Utc>, from: i64, to: i64) -> JwtClaims {
        JwtClaims::new(
            UserId::new(),
            Role::User,
            now + Duration::minutes(from),
            now + Duration::minutes(to),
        )
    }

    #[test]
    fn accepts_current_window() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_around(now, -1, 10), now), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims_around(now, -20, -10), now),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims_around(now, 5, 10), now),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims_around(now, 10, 5), now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn missing_role_defaults_to_user() {
        let raw = serde_json::json!({
            "sub": UserId::new().to_string(),
            "iat": 1,
            "exp": 2
        });
        let claims: JwtClaims = serde_json::from_value(raw).unwrap();
        assert_eq!(claims.role, Role::User);
    }
}
