use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::engine::availability::TimeRange;
use crate::models::{Space, SpaceStatus, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub space_id: Uuid,
    pub client_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub total_amount: Decimal,
    pub payment_status: bool,
    pub payment_reference: Option<String>,
    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> TimeRange {
        TimeRange::from_stored(self.start_time, self.end_time)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// Request body of `POST /bookings`. `client_id` defaults to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBooking {
    pub space_id: Uuid,
    pub client_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub special_requests: Option<String>,
}

/// A booking request whose client and time range have been checked.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub space_id: Uuid,
    pub client_id: Uuid,
    pub range: TimeRange,
    pub special_requests: Option<String>,
}

impl NewBooking {
    pub fn into_booking(self, total_amount: Decimal, now: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            space_id: self.space_id,
            client_id: self.client_id,
            start_time: self.range.start(),
            end_time: self.range.end(),
            status: BookingStatus::Pending,
            total_amount,
            payment_status: false,
            payment_reference: None,
            special_requests: self.special_requests,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionBooking {
    pub booking_id: Uuid,
    pub target: BookingStatus,
    pub cancellation_reason: Option<String>,
}

/// A committed transition together with the space status it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct BookingTransition {
    pub booking: Booking,
    pub space_status: SpaceStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelBooking {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    #[serde(skip)]
    pub client_id: Option<Uuid>,
    #[serde(skip)]
    pub space_id: Option<Uuid>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.map_or(true, |s| booking.status == s)
            && self.client_id.map_or(true, |c| booking.client_id == c)
            && self.space_id.map_or(true, |s| booking.space_id == s)
    }
}

/// Admin listing row: the booking with its space and client inlined.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub space: Option<Space>,
    pub user: Option<User>,
}
