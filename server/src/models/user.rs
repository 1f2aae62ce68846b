use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SpaceOwner,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SpaceOwner => "space_owner",
            Role::Client => "client",
        }
    }

    /// Roles a visitor may pick for themselves at registration.
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated account ready to be stored. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_verified: bool,
    pub verification_token: Option<String>,
}

impl NewUser {
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: Uuid::new_v4(),
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            is_verified: self.is_verified,
            verification_token: self.verification_token,
            phone_number: None,
            profile_picture: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl RegisterUser {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;
        if !self.role.is_self_assignable() {
            return Err(AppError::ValidationError(format!(
                "Role '{}' cannot be chosen at registration",
                self.role
            )));
        }
        Ok(())
    }
}

/// Self-service profile fields. Email and role are not editable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateProfile {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(first_name) = &self.first_name {
            require_non_empty("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_empty("last_name", last_name)?;
        }
        Ok(())
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(phone_number) = self.phone_number {
            user.phone_number = Some(phone_number);
        }
        if let Some(profile_picture) = self.profile_picture {
            user.profile_picture = Some(profile_picture);
        }
    }
}

/// Admin-side account edit. The only path through which a role may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
}

impl AdminUpdateUser {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(first_name) = &self.first_name {
            require_non_empty("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_empty("last_name", last_name)?;
        }
        Ok(())
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = self.email {
            user.email = normalize_email(&email);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_verified) = self.is_verified {
            user.is_verified = is_verified;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::ValidationError(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    Ok(())
}
