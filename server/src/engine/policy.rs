use uuid::Uuid;

use crate::auth::Principal;
use crate::models::{Booking, BookingStatus, Role, Space};
use crate::utils::{AppError, AppResult};

/// Statuses each kind of actor may ask for. Whether the move is legal from
/// the booking's current status is the lifecycle table's call. Space owners
/// may read the bookings of their spaces but never move them.
const ADMIN_TARGETS: &[BookingStatus] = &[
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::Cancelled,
    BookingStatus::Completed,
];
const CLIENT_TARGETS: &[BookingStatus] = &[BookingStatus::Cancelled];

fn allowed_targets(actor: &Principal, booking: &Booking) -> &'static [BookingStatus] {
    if actor.role == Role::Admin {
        ADMIN_TARGETS
    } else if actor.user_id == booking.client_id {
        CLIENT_TARGETS
    } else {
        &[]
    }
}

pub fn authorize_transition(
    actor: &Principal,
    booking: &Booking,
    target: BookingStatus,
) -> AppResult<()> {
    if allowed_targets(actor, booking).contains(&target) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "Not allowed to move booking '{}' to '{target}'",
        booking.id
    )))
}

pub fn can_view_booking(actor: &Principal, booking: &Booking, space_owner: Uuid) -> bool {
    actor.role == Role::Admin || actor.user_id == booking.client_id || actor.user_id == space_owner
}

pub fn ensure_space_manager(actor: &Principal, space: &Space) -> AppResult<()> {
    if actor.role == Role::Admin || space.is_owned_by(actor.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "Space '{}' belongs to another owner",
        space.id
    )))
}

pub fn ensure_space_owner(actor: &Principal, space: &Space) -> AppResult<()> {
    if space.is_owned_by(actor.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "Only the owner of space '{}' may change it",
        space.id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    fn booking_for(client: Uuid) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            space_id: Uuid::new_v4(),
            client_id: client,
            start_time: now,
            end_time: now + chrono::Duration::hours(1),
            status: BookingStatus::Pending,
            total_amount: Decimal::ZERO,
            payment_status: false,
            payment_reference: None,
            special_requests: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_admin_manages_bookings() {
        let client = principal(Role::Client);
        let admin = principal(Role::Admin);
        let booking = booking_for(client.user_id);

        for target in [BookingStatus::Confirmed, BookingStatus::Cancelled, BookingStatus::Completed] {
            assert!(authorize_transition(&admin, &booking, target).is_ok());
        }
    }

    #[test]
    fn test_space_owner_may_view_but_not_move() {
        let client = principal(Role::Client);
        let owner = principal(Role::SpaceOwner);
        let booking = booking_for(client.user_id);

        for target in [BookingStatus::Confirmed, BookingStatus::Cancelled, BookingStatus::Completed] {
            assert!(matches!(
                authorize_transition(&owner, &booking, target),
                Err(AppError::Forbidden(_))
            ));
        }
        assert!(can_view_booking(&owner, &booking, owner.user_id));
    }

    #[test]
    fn test_client_may_only_cancel() {
        let client = principal(Role::Client);
        let booking = booking_for(client.user_id);

        assert!(authorize_transition(&client, &booking, BookingStatus::Cancelled).is_ok());
        assert!(matches!(
            authorize_transition(&client, &booking, BookingStatus::Confirmed),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_strangers_are_refused() {
        let booking = booking_for(Uuid::new_v4());
        let stranger = principal(Role::SpaceOwner);
        let owner_id = Uuid::new_v4();

        assert!(authorize_transition(&stranger, &booking, BookingStatus::Cancelled).is_err());
        assert!(!can_view_booking(&stranger, &booking, owner_id));
    }
}
