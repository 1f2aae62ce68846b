//! Booking engine: creation, pricing, lifecycle transitions and the space
//! status they imply.
//!
//! The pure planning functions ([`plan_booking`], [`plan_transition`]) hold
//! every rule and are shared by all repository implementations, which call
//! them from inside their own unit of work. [`BookingEngine`] adds the actor
//! checks in front.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::auth::Principal;
use crate::models::booking::{CreateBooking, TransitionBooking};
use crate::models::{
    Booking, BookingFilter, BookingStatus, BookingTransition, NewBooking, Space, SpaceStatus,
};
use crate::repository::{BookingRepository, SpaceRepository};
use crate::utils::{AppError, AppResult, Page, PageParams};

pub mod availability;
pub mod lifecycle;
pub mod policy;
pub mod pricing;
pub mod space_status;

use availability::{Availability, TimeRange};
use space_status::derive_space_status;

/// Checks a new booking against its (locked) space and that space's confirmed
/// bookings, and returns the price to store.
pub fn plan_booking(
    space: &Space,
    request: &NewBooking,
    confirmed: &[Booking],
) -> AppResult<Decimal> {
    if !space.is_active {
        return Err(AppError::ValidationError(format!(
            "Space '{}' is not accepting bookings",
            space.id
        )));
    }
    Availability::from_bookings(confirmed).ensure_free(&request.range)?;
    pricing::quote(&request.range, space.price_per_hour, space.price_per_day)
}

/// Validates `booking -> target` and returns the status its space must take
/// once the move commits. `confirmed` are the space's confirmed bookings as
/// read inside the unit of work, possibly including `booking` itself.
pub fn plan_transition(
    booking: &Booking,
    space: &Space,
    target: BookingStatus,
    confirmed: &[Booking],
) -> AppResult<SpaceStatus> {
    booking.status.transition_to(target)?;
    if target == BookingStatus::Confirmed && !space.is_active {
        return Err(AppError::ValidationError(format!(
            "Space '{}' is no longer accepting bookings",
            space.id
        )));
    }

    let others = Availability::from_bookings(confirmed.iter().filter(|b| b.id != booking.id));
    if target == BookingStatus::Confirmed {
        others.ensure_free(&booking.range())?;
    }

    let held = others.held() + usize::from(target == BookingStatus::Confirmed);
    Ok(derive_space_status(space.status, held))
}

/// Space status after an operator edit: `requested` replaces the current flag,
/// then bookings have their say.
pub fn plan_space_status(
    current: SpaceStatus,
    requested: Option<SpaceStatus>,
    confirmed: usize,
) -> SpaceStatus {
    derive_space_status(requested.unwrap_or(current), confirmed)
}

#[derive(Clone)]
pub struct BookingEngine {
    bookings: Arc<dyn BookingRepository>,
    spaces: Arc<dyn SpaceRepository>,
}

impl BookingEngine {
    pub fn new(bookings: Arc<dyn BookingRepository>, spaces: Arc<dyn SpaceRepository>) -> Self {
        Self { bookings, spaces }
    }

    pub async fn create(&self, actor: &Principal, request: CreateBooking) -> AppResult<Booking> {
        let client_id = request.client_id.unwrap_or(actor.user_id);
        if client_id != actor.user_id && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Bookings can only be made for your own account".to_string(),
            ));
        }

        let range = TimeRange::new(request.start_time, request.end_time)?;
        let booking = self
            .bookings
            .create(NewBooking {
                space_id: request.space_id,
                client_id,
                range,
                special_requests: request.special_requests,
            })
            .await?;

        info!(
            booking_id = %booking.id,
            space_id = %booking.space_id,
            client_id = %booking.client_id,
            total_amount = %booking.total_amount,
            "Booking created"
        );
        Ok(booking)
    }

    pub async fn transition(
        &self,
        actor: &Principal,
        booking_id: Uuid,
        target: BookingStatus,
        cancellation_reason: Option<String>,
    ) -> AppResult<BookingTransition> {
        let booking = self.booking(booking_id).await?;
        policy::authorize_transition(actor, &booking, target)?;
        // Fail fast on moves the table never allows; the store re-checks under lock.
        booking.status.transition_to(target)?;

        let cancellation_reason = if target == BookingStatus::Cancelled {
            cancellation_reason
        } else {
            None
        };
        let outcome = self
            .bookings
            .transition(TransitionBooking {
                booking_id,
                target,
                cancellation_reason,
            })
            .await?;

        info!(
            booking_id = %booking_id,
            actor = %actor.user_id,
            from = %booking.status,
            to = %target,
            space_status = ?outcome.space_status,
            "Booking transitioned"
        );
        Ok(outcome)
    }

    pub async fn cancel(
        &self,
        actor: &Principal,
        booking_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<BookingTransition> {
        self.transition(actor, booking_id, BookingStatus::Cancelled, reason)
            .await
    }

    pub async fn get(&self, actor: &Principal, booking_id: Uuid) -> AppResult<Booking> {
        let (booking, space) = self.load(booking_id).await?;
        if !policy::can_view_booking(actor, &booking, space.owner_id) {
            return Err(AppError::Forbidden(format!(
                "Not allowed to view booking '{booking_id}'"
            )));
        }
        Ok(booking)
    }

    pub async fn list_for_client(
        &self,
        actor: &Principal,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> AppResult<Page<Booking>> {
        let filter = BookingFilter {
            status,
            client_id: Some(actor.user_id),
            space_id: None,
        };
        self.bookings.list(filter, page).await
    }

    pub async fn list_for_space(
        &self,
        actor: &Principal,
        space_id: Uuid,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> AppResult<Page<Booking>> {
        let space = self.space(space_id).await?;
        policy::ensure_space_manager(actor, &space)?;
        let filter = BookingFilter {
            status,
            client_id: None,
            space_id: Some(space_id),
        };
        self.bookings.list(filter, page).await
    }

    /// Confirmed intervals currently holding the space.
    pub async fn availability(&self, space_id: Uuid) -> AppResult<Vec<TimeRange>> {
        self.space(space_id).await?;
        let confirmed = self.bookings.confirmed_for_space(space_id).await?;
        Ok(Availability::from_bookings(&confirmed).intervals())
    }

    async fn space(&self, space_id: Uuid) -> AppResult<Space> {
        self.spaces
            .find_by_id(space_id)
            .await?
            .ok_or_else(|| AppError::not_found("Space", space_id))
    }

    async fn booking(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking", booking_id))
    }

    async fn load(&self, booking_id: Uuid) -> AppResult<(Booking, Space)> {
        let booking = self.booking(booking_id).await?;
        let space = self.space(booking.space_id).await?;
        Ok((booking, space))
    }
}
