//! # Auth Stub
//!
//! Bearer-header gate for the collection routes.
//!
//! Tokens are never verified. With `auth.enabled = false` every caller is
//! anonymous; when enabled, a request only needs a non-empty
//! `Authorization: Bearer <token>` header.

use super::error::ApiError;
use super::handlers::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// Caller identity as far as the stub can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentUser {
    /// Auth disabled.
    Anonymous,
    /// Presented a bearer token. The token is kept as given.
    Bearer(String),
}

impl CurrentUser {
    /// Returns true if no credentials were checked.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Extracts the token from an `Authorization` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.settings.auth.enabled {
            return Ok(Self::Anonymous);
        }
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(|token| Self::Bearer(token.to_string()))
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
