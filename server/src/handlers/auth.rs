use axum::extract::State;
use axum::response::Response;

use crate::accounts::{
    self, LoginRequest, PasswordResetRequest, TokenRequest, UpdatePasswordRequest,
};
use crate::auth::{AuthUser, RefreshUser};
use crate::models::user::RegisterUser;
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::{AppError, AppJson, AppResult};

pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterUser>,
) -> AppResult<Response> {
    let user = accounts::register(&state, body).await?;
    Ok(created(
        user,
        "User registered successfully. Please check your email for verification.",
    ))
}

pub async fn verify_email(
    State(state): State<AppState>,
    AppJson(body): AppJson<TokenRequest>,
) -> AppResult<Response> {
    let user = accounts::verify_email(&state, &body.token).await?;
    Ok(success(user, "Email verified successfully"))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Response> {
    let session = accounts::login(&state, body).await?;
    Ok(success(session, "Login successful"))
}

pub async fn refresh(
    State(state): State<AppState>,
    RefreshUser(principal): RefreshUser,
) -> AppResult<Response> {
    let token = accounts::refresh(&state, &principal)?;
    Ok(success(token, "Token refreshed"))
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Response> {
    let user = state
        .users
        .find_by_id(principal.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", principal.user_id))?;
    Ok(success(user, "Current user"))
}

/// Tokens are stateless; the client discards them.
pub async fn logout(AuthUser(_): AuthUser) -> Response {
    empty_success("Successfully logged out")
}

pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(body): AppJson<PasswordResetRequest>,
) -> AppResult<Response> {
    accounts::request_password_reset(&state, &body.email).await?;
    Ok(empty_success("Password reset instructions sent to your email"))
}

pub async fn update_password(
    State(state): State<AppState>,
    AppJson(body): AppJson<UpdatePasswordRequest>,
) -> AppResult<Response> {
    accounts::update_password(&state, body).await?;
    Ok(empty_success("Password updated successfully"))
}
