use axum::extract::State;
use axum::response::Response;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::engine::policy;
use crate::models::space::CreateSpace;
use crate::models::{BookingFilter, Space, SpaceChanges, SpaceFilter};
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::{AppError, AppJson, AppPath, AppQuery, AppResult, PageParams};

async fn load_space(state: &AppState, id: Uuid) -> AppResult<Space> {
    state
        .spaces
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Space", id))
}

pub async fn list_spaces(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<SpaceFilter>,
) -> AppResult<Response> {
    let filter = SpaceFilter {
        owner_id: None,
        include_inactive: false,
        ..filter
    };
    let spaces = state.spaces.list(filter, page).await?;
    Ok(success(spaces, "Spaces retrieved"))
}

pub async fn create_space(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppJson(body): AppJson<CreateSpace>,
) -> AppResult<Response> {
    body.validate()?;
    let space = state.spaces.create(actor.user_id, body).await?;
    info!(space_id = %space.id, owner_id = %space.owner_id, "Space created");
    Ok(created(space, "Space created successfully"))
}

pub async fn owner_spaces(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<SpaceFilter>,
) -> AppResult<Response> {
    let filter = SpaceFilter {
        owner_id: Some(actor.user_id),
        include_inactive: false,
        ..filter
    };
    let spaces = state.spaces.list(filter, page).await?;
    Ok(success(spaces, "Owner spaces retrieved"))
}

pub async fn get_space(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    let space = load_space(&state, id).await?;
    Ok(success(space, "Space retrieved"))
}

pub async fn update_space(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<SpaceChanges>,
) -> AppResult<Response> {
    let space = load_space(&state, id).await?;
    policy::ensure_space_owner(&actor, &space)?;
    body.validate()?;

    let space = state.spaces.update(id, body).await?;
    info!(space_id = %space.id, status = ?space.status, "Space updated");
    Ok(success(space, "Space updated successfully"))
}

pub async fn delete_space(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    let space = load_space(&state, id).await?;
    policy::ensure_space_owner(&actor, &space)?;

    state.spaces.deactivate(id).await?;
    info!(space_id = %id, "Space deactivated");
    Ok(empty_success("Space deleted successfully"))
}

pub async fn space_availability(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    let intervals = state.engine.availability(id).await?;
    Ok(success(intervals, "Confirmed bookings for space"))
}

pub async fn space_bookings(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<BookingFilter>,
) -> AppResult<Response> {
    let bookings = state
        .engine
        .list_for_space(&actor, id, filter.status, page)
        .await?;
    Ok(success(bookings, "Space bookings retrieved"))
}
