use axum::extract::State;
use axum::response::Response;
use tracing::info;

use crate::auth::AuthUser;
use crate::models::user::UpdateProfile;
use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::{AppError, AppJson, AppResult};

pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Response> {
    let user = state
        .users
        .find_by_id(principal.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", principal.user_id))?;
    Ok(success(user, "Profile retrieved"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(body): AppJson<UpdateProfile>,
) -> AppResult<Response> {
    body.validate()?;
    let user = state.users.update_profile(principal.user_id, body).await?;
    info!(user_id = %user.id, "Profile updated");
    Ok(success(user, "Profile updated successfully"))
}
