use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::booking::{CancelBooking, CreateBooking, UpdateBookingStatus};
use crate::models::BookingFilter;
use crate::state::AppState;
use crate::utils::response::{created, success};
use crate::utils::{AppJson, AppPath, AppQuery, AppResult, PageParams};

pub async fn create_booking(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppJson(body): AppJson<CreateBooking>,
) -> AppResult<Response> {
    let booking = state.engine.create(&actor, body).await?;
    Ok(created(booking, "Booking created successfully"))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(filter): AppQuery<BookingFilter>,
) -> AppResult<Response> {
    let bookings = state
        .engine
        .list_for_client(&actor, filter.status, page)
        .await?;
    Ok(success(bookings, "Bookings retrieved"))
}

pub async fn get_booking(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    let booking = state.engine.get(&actor, id).await?;
    Ok(success(booking, "Booking retrieved"))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateBookingStatus>,
) -> AppResult<Response> {
    let outcome = state
        .engine
        .transition(&actor, id, body.status, body.cancellation_reason)
        .await?;
    Ok(success(outcome, "Booking updated successfully"))
}

/// The body is optional; `{"reason": "..."}` records why.
pub async fn cancel_booking(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppPath(id): AppPath<Uuid>,
    body: Option<AppJson<CancelBooking>>,
) -> AppResult<Response> {
    let reason = body.and_then(|AppJson(body)| body.reason);
    let outcome = state.engine.cancel(&actor, id, reason).await?;
    Ok(success(outcome, "Booking cancelled successfully"))
}
