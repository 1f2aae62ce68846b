//! Account lifecycle: registration, email verification, login, token refresh
//! and password reset.

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, Principal, TokenKind};
use crate::config::AdminSeed;
use crate::mailer::MailMessage;
use crate::models::user::{
    normalize_email, validate_email, validate_password, AdminUpdateUser, NewUser, RegisterUser,
};
use crate::models::{Role, User};
use crate::state::AppState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

fn one_time_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Verification mail is best effort: the account change has already committed.
async fn deliver(state: &AppState, message: MailMessage) {
    let to = message.to.clone();
    if let Err(e) = state.mailer.send(message).await {
        error!(to = %to, error = %e, "Failed to deliver account email");
    }
}

pub async fn register(state: &AppState, request: RegisterUser) -> AppResult<User> {
    request.validate()?;
    let email = normalize_email(&request.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(format!("Email '{email}' is already registered")));
    }

    let token = one_time_token();
    let user = state
        .users
        .create(NewUser {
            email,
            password_hash: hash_password(&request.password)?,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            role: request.role,
            is_verified: false,
            verification_token: Some(token.clone()),
        })
        .await?;

    info!(user_id = %user.id, role = %user.role, "User registered");
    deliver(state, MailMessage::verification(&user.email, &token)).await;
    Ok(user)
}

pub async fn verify_email(state: &AppState, token: &str) -> AppResult<User> {
    let user = find_by_token(state, token).await?;
    let user = state.users.mark_verified(user.id).await?;
    info!(user_id = %user.id, "Email verified");
    Ok(user)
}

pub async fn login(state: &AppState, request: LoginRequest) -> AppResult<LoginResponse> {
    let invalid = || AppError::AuthError("Invalid email or password".to_string());

    let user = state
        .users
        .find_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&request.password, &user.password_hash) {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(AppError::AuthError("Account is deactivated".to_string()));
    }
    if state.require_verified_email && !user.is_verified {
        return Err(AppError::Forbidden("Please verify your email first".to_string()));
    }

    let tokens = state.tokens.issue_pair(&Principal::from(&user))?;
    info!(user_id = %user.id, "User logged in");
    Ok(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
        user,
    })
}

pub fn refresh(state: &AppState, principal: &Principal) -> AppResult<AccessToken> {
    Ok(AccessToken {
        access_token: state.tokens.issue(principal, TokenKind::Access)?,
        token_type: "Bearer",
        expires_in: state.tokens.access_ttl().num_seconds(),
    })
}

pub async fn request_password_reset(state: &AppState, email: &str) -> AppResult<()> {
    validate_email(email)?;
    let email = normalize_email(email);
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No account for '{email}'")))?;

    let token = one_time_token();
    state
        .users
        .set_verification_token(user.id, Some(token.clone()))
        .await?;
    // Without the mail the token is unusable, so delivery failures surface.
    state
        .mailer
        .send(MailMessage::password_reset(&user.email, &token))
        .await
        .map_err(|e| {
            error!(to = %user.email, error = %e, "Failed to deliver password reset email");
            AppError::ExternalServiceError("Password reset email could not be sent".to_string())
        })
}

pub async fn update_password(state: &AppState, request: UpdatePasswordRequest) -> AppResult<()> {
    validate_password(&request.new_password)?;
    let user = find_by_token(state, &request.token).await?;
    state
        .users
        .update_password(user.id, hash_password(&request.new_password)?)
        .await?;
    info!(user_id = %user.id, "Password updated");
    Ok(())
}

/// Makes sure the configured administrator exists. Running it again with the
/// same seed changes nothing.
pub async fn ensure_admin(state: &AppState, seed: &AdminSeed) -> AppResult<User> {
    validate_email(&seed.email)?;
    validate_password(&seed.password)?;
    let email = normalize_email(&seed.email);

    if let Some(existing) = state.users.find_by_email(&email).await? {
        if existing.role == Role::Admin {
            return Ok(existing);
        }
        let promoted = state
            .users
            .admin_update(
                existing.id,
                AdminUpdateUser {
                    role: Some(Role::Admin),
                    is_verified: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %promoted.id, "Existing account promoted to admin");
        return Ok(promoted);
    }

    let admin = state
        .users
        .create(NewUser {
            email,
            password_hash: hash_password(&seed.password)?,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            role: Role::Admin,
            is_verified: true,
            verification_token: None,
        })
        .await?;
    info!(user_id = %admin.id, "Admin account created");
    Ok(admin)
}

async fn find_by_token(state: &AppState, token: &str) -> AppResult<User> {
    if token.trim().is_empty() {
        return Err(AppError::ValidationError("Token is required".to_string()));
    }
    state
        .users
        .find_by_verification_token(token)
        .await?
        .ok_or_else(|| AppError::ValidationError("Invalid or expired token".to_string()))
}
