use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::{Principal, TokenKind};
use crate::state::AppState;
use crate::utils::{AppError, AppResult};

/// The caller behind a valid access token.
///
/// Once resolved, the principal is cached in the request extensions so a role
/// gate in front of the handler and the handler itself share one lookup.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

/// The caller behind a valid refresh token.
#[derive(Debug, Clone, Copy)]
pub struct RefreshUser(pub Principal);

fn bearer_token(parts: &Parts) -> AppResult<&str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::AuthError("Missing authorization header".to_string()))?;

    match header.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::AuthError(
            "Invalid authorization format. Expected 'Bearer <token>'".to_string(),
        )),
    }
}

/// Loads the account behind a token. Deleted or deactivated accounts lose
/// access immediately even while their tokens are unexpired.
async fn resolve(state: &AppState, user_id: Uuid) -> AppResult<Principal> {
    match state.users.find_by_id(user_id).await? {
        Some(user) if user.is_active => Ok(Principal::from(&user)),
        _ => Err(AppError::AuthError("Account is not active".to_string())),
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Self(*principal));
        }

        let claims = state.tokens.verify(bearer_token(parts)?, TokenKind::Access)?;
        let principal = resolve(state, claims.sub).await?;
        parts.extensions.insert(principal);
        Ok(Self(principal))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RefreshUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = state.tokens.verify(bearer_token(parts)?, TokenKind::Refresh)?;
        Ok(Self(resolve(state, claims.sub).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))).unwrap(), "abc.def");
        assert!(bearer_token(&parts(None)).is_err());
        assert!(bearer_token(&parts(Some("Basic Zm9vOmJhcg=="))).is_err());
        assert!(bearer_token(&parts(Some("Bearer "))).is_err());
    }
}
