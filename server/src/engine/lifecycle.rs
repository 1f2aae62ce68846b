use crate::models::BookingStatus;
use crate::utils::{AppError, AppResult};

/// Every legal booking move. Anything absent, self-transitions included, is refused.
pub const TRANSITIONS: [(BookingStatus, BookingStatus); 4] = [
    (BookingStatus::Pending, BookingStatus::Confirmed),
    (BookingStatus::Pending, BookingStatus::Cancelled),
    (BookingStatus::Confirmed, BookingStatus::Cancelled),
    (BookingStatus::Confirmed, BookingStatus::Completed),
];

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        TRANSITIONS.contains(&(self, next))
    }

    pub fn transition_to(self, next: BookingStatus) -> AppResult<BookingStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::Conflict(format!(
                "Invalid booking transition from '{self}' to '{next}'"
            )))
        }
    }
}
