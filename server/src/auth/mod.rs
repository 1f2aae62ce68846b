//! Authentication and role gating.
//!
//! Requests carry an HS256 access token as `Authorization: Bearer <token>`.
//! [`AuthUser`] resolves it to a [`Principal`] by loading the user, so the
//! stored role and `is_active` flag are authoritative rather than the claims.

use uuid::Uuid;

use crate::models::{Role, User};

pub mod extractor;
pub mod gate;
pub mod password;
pub mod token;

pub use extractor::{AuthUser, RefreshUser};
pub use gate::{require_roles, RoleGate, ADMIN_ONLY, LISTING_MANAGERS};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys, TokenKind, TokenPair};

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}
