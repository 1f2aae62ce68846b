use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::{AuthUser, Principal};
use crate::models::Role;
use crate::state::AppState;
use crate::utils::{AppError, AppResult};

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const LISTING_MANAGERS: &[Role] = &[Role::SpaceOwner, Role::Admin];

pub fn authorize(principal: &Principal, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&principal.role) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "Role '{}' may not access this resource",
        principal.role
    )))
}

/// State for [`require_roles`]: the app state plus the roles a route group admits.
#[derive(Clone)]
pub struct RoleGate {
    pub state: AppState,
    pub allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(state: AppState, allowed: &'static [Role]) -> Self {
        Self { state, allowed }
    }
}

/// Rejects the request with 401 when unauthenticated and 403 when the
/// caller's role is not in the gate's list.
pub async fn require_roles(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();
    let AuthUser(principal) = AuthUser::from_request_parts(&mut parts, &gate.state).await?;
    authorize(&principal, gate.allowed)?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}
