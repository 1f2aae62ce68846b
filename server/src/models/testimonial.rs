use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::AppError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "testimonial_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TestimonialStatus {
    Pending,
    Approved,
    Rejected,
}

impl TestimonialStatus {
    /// Moderation is a one-shot decision: pending moves to approved or
    /// rejected, and both of those are terminal.
    pub fn moderate(self, decision: TestimonialStatus) -> Result<TestimonialStatus, AppError> {
        match (self, decision) {
            (TestimonialStatus::Pending, TestimonialStatus::Approved)
            | (TestimonialStatus::Pending, TestimonialStatus::Rejected) => Ok(decision),
            (from, to) => Err(AppError::Conflict(format!(
                "Invalid testimonial transition from '{}' to '{}'",
                from.as_str(),
                to.as_str()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestimonialStatus::Pending => "pending",
            TestimonialStatus::Approved => "approved",
            TestimonialStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub status: TestimonialStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonial {
    pub space_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

impl CreateTestimonial {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::ValidationError(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        if self.comment.trim().is_empty() {
            return Err(AppError::ValidationError(
                "comment must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_testimonial(self, user_id: Uuid, now: DateTime<Utc>) -> Testimonial {
        Testimonial {
            id: Uuid::new_v4(),
            user_id,
            space_id: self.space_id,
            rating: self.rating,
            comment: self.comment,
            status: TestimonialStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerateTestimonial {
    pub status: TestimonialStatus,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TestimonialFilter {
    pub status: Option<TestimonialStatus>,
    pub space_id: Option<Uuid>,
}

impl TestimonialFilter {
    pub fn matches(&self, testimonial: &Testimonial) -> bool {
        self.status.map_or(true, |s| testimonial.status == s)
            && self.space_id.map_or(true, |s| testimonial.space_id == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_approved_or_rejected() {
        use TestimonialStatus::*;
        assert_eq!(Pending.moderate(Approved).unwrap(), Approved);
        assert_eq!(Pending.moderate(Rejected).unwrap(), Rejected);
    }

    #[test]
    fn test_decisions_are_terminal() {
        use TestimonialStatus::*;
        for from in [Approved, Rejected] {
            for to in [Pending, Approved, Rejected] {
                assert!(
                    matches!(from.moderate(to), Err(AppError::Conflict(_))),
                    "{from:?} -> {to:?} should be rejected"
                );
            }
        }
        assert!(Pending.moderate(Pending).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        let mut request = CreateTestimonial {
            space_id: Uuid::new_v4(),
            rating: 5,
            comment: "Great light".into(),
        };
        assert!(request.validate().is_ok());

        request.rating = 0;
        assert!(request.validate().is_err());
        request.rating = 6;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_new_testimonial_awaits_moderation() {
        let author = Uuid::new_v4();
        let testimonial = CreateTestimonial {
            space_id: Uuid::new_v4(),
            rating: 4,
            comment: "Quiet and clean".into(),
        }
        .into_testimonial(author, Utc::now());
        assert_eq!(testimonial.status, TestimonialStatus::Pending);
        assert_eq!(testimonial.user_id, author);
    }
}
