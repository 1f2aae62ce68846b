//! Administrator surface. Every route here sits behind the `ADMIN_ONLY` gate.

use axum::extract::State;
use axum::response::Response;
use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::booking::UpdateBookingStatus;
use crate::models::testimonial::ModerateTestimonial;
use crate::models::user::{AdminUpdateUser, UserFilter};
use crate::models::{
    BookingDetails, BookingFilter, Role, SpaceChanges, SpaceFilter, TestimonialFilter,
};
use crate::state::AppState;
use crate::utils::response::{empty_success, success};
use crate::utils::{AppError, AppJson, AppPath, AppQuery, AppResult, PageParams};

const REVENUE_WINDOW_DAYS: i64 = 30;

pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<UserFilter>,
) -> AppResult<Response> {
    let users = state.users.list(filter, page).await?;
    Ok(success(users, "Users retrieved"))
}

pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(success(user, "User retrieved"))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<AdminUpdateUser>,
) -> AppResult<Response> {
    body.validate()?;
    if id == admin.user_id && body.role.is_some_and(|role| role != Role::Admin) {
        return Err(AppError::ValidationError(
            "Administrators cannot remove their own admin role".to_string(),
        ));
    }
    let user = state.users.admin_update(id, body).await?;
    info!(user_id = %id, admin_id = %admin.user_id, role = %user.role, "User updated by admin");
    Ok(success(user, "User updated successfully"))
}

/// Deactivates the account; its bookings and listings stay for history.
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    if id == admin.user_id {
        return Err(AppError::ValidationError(
            "Administrators cannot deactivate their own account".to_string(),
        ));
    }
    state.users.deactivate(id).await?;
    info!(user_id = %id, admin_id = %admin.user_id, "User deactivated");
    Ok(empty_success("User deleted successfully"))
}

pub async fn list_spaces(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<SpaceFilter>,
) -> AppResult<Response> {
    let filter = SpaceFilter {
        owner_id: None,
        include_inactive: true,
        ..filter
    };
    let spaces = state.spaces.list(filter, page).await?;
    Ok(success(spaces, "Spaces retrieved"))
}

pub async fn update_space(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<SpaceChanges>,
) -> AppResult<Response> {
    body.validate()?;
    let space = state.spaces.update(id, body).await?;
    info!(space_id = %id, admin_id = %admin.user_id, status = ?space.status, "Space updated by admin");
    Ok(success(space, "Space updated successfully"))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<BookingFilter>,
) -> AppResult<Response> {
    let filter = BookingFilter {
        status: filter.status,
        client_id: None,
        space_id: None,
    };
    let bookings = state.bookings.list(filter, page).await?;

    let mut related = Vec::with_capacity(bookings.items.len());
    for booking in &bookings.items {
        related.push((
            state.spaces.find_by_id(booking.space_id).await?,
            state.users.find_by_id(booking.client_id).await?,
        ));
    }
    let mut related = related.into_iter();
    let details = bookings.map(|booking| {
        let (space, user) = related.next().unwrap_or_default();
        BookingDetails {
            booking,
            space,
            user,
        }
    });
    Ok(success(details, "Bookings retrieved"))
}

pub async fn update_booking(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateBookingStatus>,
) -> AppResult<Response> {
    let outcome = state
        .engine
        .transition(&admin, id, body.status, body.cancellation_reason)
        .await?;
    Ok(success(outcome, "Booking updated successfully"))
}

pub async fn list_testimonials(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<TestimonialFilter>,
) -> AppResult<Response> {
    let testimonials = state.testimonials.list(filter, page).await?;
    Ok(success(testimonials, "Testimonials retrieved"))
}

pub async fn moderate_testimonial(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<ModerateTestimonial>,
) -> AppResult<Response> {
    let testimonial = state.testimonials.moderate(id, body.status).await?;
    info!(testimonial_id = %id, admin_id = %admin.user_id, status = testimonial.status.as_str(), "Testimonial moderated");
    Ok(success(testimonial, "Testimonial updated successfully"))
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Response> {
    let since = Utc::now() - Duration::days(REVENUE_WINDOW_DAYS);
    let stats = state.stats.platform_stats(since).await?;
    Ok(success(stats, "Platform statistics"))
}
