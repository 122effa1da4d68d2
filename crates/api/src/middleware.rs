use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use vault_auth::JwtValidator;

use crate::app::errors;
use crate::context::RequesterContext;

const SIGN_IN_REQUIRED: &str = "Sign in required";
const UNAUTHORIZED_ACCESS: &str = "UnAuthorized Access";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Verify the token and attach a [`RequesterContext`] to the request.
pub async fn require_sign_in(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(req.headers()) else {
        return errors::auth_failure(SIGN_IN_REQUIRED);
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!(error = %e, "rejected bearer token");
            return errors::auth_failure(SIGN_IN_REQUIRED);
        }
    };

    req.extensions_mut()
        .insert(RequesterContext::new(claims.sub, claims.role));

    next.run(req).await
}

/// Must run inside [`require_sign_in`].
pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<RequesterContext>() {
        None => errors::auth_failure(SIGN_IN_REQUIRED),
        Some(requester) if !requester.is_admin() => {
            tracing::info!(user_id = %requester.user_id(), "non-admin hit an admin route");
            errors::auth_failure(UNAUTHORIZED_ACCESS)
        }
        Some(_) => next.run(req).await,
    }
}

/// `Authorization: Bearer <jwt>` or the bare token.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim();

    if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        map
    }

    #[test]
    fn accepts_bearer_and_bare_tokens() {
        assert_eq!(extract_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_token(&headers("abc.def")), Some("abc.def"));
    }

    #[test]
    fn rejects_missing_or_blank_tokens() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        assert_eq!(extract_token(&headers("Bearer ")), None);
        assert_eq!(extract_token(&headers("Bearer")), None);
    }
}
