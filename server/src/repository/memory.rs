//! In-process store used by the test suite and by local runs without
//! `DATABASE_URL`.
//!
//! Every operation takes the single state lock for its whole duration, which
//! gives the same all-or-nothing behaviour as a database transaction. Rows are
//! kept in insertion order, matching the `ORDER BY created_at, id` of the
//! PostgreSQL store.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::engine::{plan_booking, plan_space_status, plan_transition};
use crate::models::booking::TransitionBooking;
use crate::models::space::CreateSpace;
use crate::models::testimonial::CreateTestimonial;
use crate::models::user::{AdminUpdateUser, NewUser, UpdateProfile, UserFilter};
use crate::models::{
    Booking, BookingFilter, BookingStatus, BookingTransition, NewBooking, PlatformStats, Space,
    SpaceChanges, SpaceFilter, Testimonial, TestimonialFilter, TestimonialStatus, User,
};
use crate::repository::{
    BookingRepository, SpaceRepository, StatsRepository, TestimonialRepository, UserRepository,
};
use crate::utils::{AppError, AppResult, Page, PageParams};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    spaces: Vec<Space>,
    bookings: Vec<Booking>,
    testimonials: Vec<Testimonial>,
}

impl MemoryState {
    fn user_mut(&mut self, id: Uuid) -> AppResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found("User", id))
    }

    fn space(&self, id: Uuid) -> AppResult<&Space> {
        self.spaces
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Space", id))
    }

    fn space_mut(&mut self, id: Uuid) -> AppResult<&mut Space> {
        self.spaces
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Space", id))
    }

    fn booking_mut(&mut self, id: Uuid) -> AppResult<&mut Booking> {
        self.bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::not_found("Booking", id))
    }

    fn confirmed_for(&self, space_id: Uuid) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.space_id == space_id && b.is_confirmed())
            .cloned()
            .collect()
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("in-memory store lock poisoned".to_string()))
    }
}

fn email_conflict(email: &str) -> AppError {
    AppError::Conflict(format!("Email '{email}' is already registered"))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.lock()?;
        if state.email_taken(&user.email, None) {
            return Err(email_conflict(&user.email));
        }
        let user = user.into_user(Utc::now());
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> AppResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list(&self, filter: UserFilter, page: PageParams) -> AppResult<Page<User>> {
        let state = self.lock()?;
        let users = state
            .users
            .iter()
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        Ok(Page::from_vec(users, page))
    }

    async fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<User> {
        let mut state = self.lock()?;
        let user = state.user_mut(id)?;
        changes.apply_to(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn admin_update(&self, id: Uuid, changes: AdminUpdateUser) -> AppResult<User> {
        let mut state = self.lock()?;
        let mut updated = state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("User", id))?;
        changes.apply_to(&mut updated);
        if state.email_taken(&updated.email, Some(id)) {
            return Err(email_conflict(&updated.email));
        }
        updated.updated_at = Utc::now();
        let user = state.user_mut(id)?;
        *user = updated.clone();
        Ok(updated)
    }

    async fn set_verification_token(&self, id: Uuid, token: Option<String>) -> AppResult<()> {
        let mut state = self.lock()?;
        let user = state.user_mut(id)?;
        user.verification_token = token;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<User> {
        let mut state = self.lock()?;
        let user = state.user_mut(id)?;
        user.is_verified = true;
        user.verification_token = None;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut state = self.lock()?;
        let user = state.user_mut(id)?;
        user.password_hash = password_hash;
        user.verification_token = None;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock()?;
        let user = state.user_mut(id)?;
        user.is_active = false;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl SpaceRepository for MemoryStore {
    async fn create(&self, owner_id: Uuid, space: CreateSpace) -> AppResult<Space> {
        let mut state = self.lock()?;
        let space = space.into_space(owner_id, Utc::now());
        state.spaces.push(space.clone());
        Ok(space)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Space>> {
        Ok(self.lock()?.spaces.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self, filter: SpaceFilter, page: PageParams) -> AppResult<Page<Space>> {
        let state = self.lock()?;
        let spaces = state
            .spaces
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        Ok(Page::from_vec(spaces, page))
    }

    async fn update(&self, id: Uuid, changes: SpaceChanges) -> AppResult<Space> {
        let mut state = self.lock()?;
        let confirmed = state.confirmed_for(id).len();
        let space = state.space_mut(id)?;
        let requested = changes.apply_to(space);
        space.status = plan_space_status(space.status, requested, confirmed);
        space.updated_at = Utc::now();
        Ok(space.clone())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock()?;
        let space = state.space_mut(id)?;
        space.is_active = false;
        space.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let mut state = self.lock()?;
        let space = state.space(booking.space_id)?;
        let confirmed = state.confirmed_for(space.id);
        let total_amount = plan_booking(space, &booking, &confirmed)?;

        let booking = booking.into_booking(total_amount, Utc::now());
        state.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.lock()?.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list(&self, filter: BookingFilter, page: PageParams) -> AppResult<Page<Booking>> {
        let state = self.lock()?;
        let bookings = state
            .bookings
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        Ok(Page::from_vec(bookings, page))
    }

    async fn confirmed_for_space(&self, space_id: Uuid) -> AppResult<Vec<Booking>> {
        Ok(self.lock()?.confirmed_for(space_id))
    }

    async fn transition(&self, change: TransitionBooking) -> AppResult<BookingTransition> {
        let mut state = self.lock()?;
        let booking = state.booking_mut(change.booking_id)?.clone();
        let space = state.space(booking.space_id)?.clone();
        let confirmed = state.confirmed_for(space.id);
        let space_status = plan_transition(&booking, &space, change.target, &confirmed)?;

        let now = Utc::now();
        let stored = state.booking_mut(booking.id)?;
        stored.status = change.target;
        if let Some(reason) = change.cancellation_reason {
            stored.cancellation_reason = Some(reason);
        }
        stored.updated_at = now;
        let booking = stored.clone();

        let space = state.space_mut(space.id)?;
        if space.status != space_status {
            space.status = space_status;
            space.updated_at = now;
        }

        Ok(BookingTransition {
            booking,
            space_status,
        })
    }
}

#[async_trait]
impl TestimonialRepository for MemoryStore {
    async fn create(&self, user_id: Uuid, testimonial: CreateTestimonial) -> AppResult<Testimonial> {
        let mut state = self.lock()?;
        state.space(testimonial.space_id)?;
        let testimonial = testimonial.into_testimonial(user_id, Utc::now());
        state.testimonials.push(testimonial.clone());
        Ok(testimonial)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Testimonial>> {
        Ok(self.lock()?.testimonials.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self, filter: TestimonialFilter, page: PageParams) -> AppResult<Page<Testimonial>> {
        let state = self.lock()?;
        let testimonials = state
            .testimonials
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        Ok(Page::from_vec(testimonials, page))
    }

    async fn moderate(&self, id: Uuid, decision: TestimonialStatus) -> AppResult<Testimonial> {
        let mut state = self.lock()?;
        let testimonial = state
            .testimonials
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::not_found("Testimonial", id))?;
        testimonial.status = testimonial.status.moderate(decision)?;
        testimonial.updated_at = Utc::now();
        Ok(testimonial.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock()?;
        let before = state.testimonials.len();
        state.testimonials.retain(|t| t.id != id);
        if state.testimonials.len() == before {
            return Err(AppError::not_found("Testimonial", id));
        }
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn platform_stats(&self, revenue_since: DateTime<Utc>) -> AppResult<PlatformStats> {
        let state = self.lock()?;
        let confirmed = state
            .bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed);

        Ok(PlatformStats {
            total_users: state.users.len() as i64,
            total_spaces: state.spaces.len() as i64,
            total_bookings: state.bookings.len() as i64,
            active_bookings: confirmed.clone().count() as i64,
            revenue_last_30_days: confirmed
                .filter(|b| b.created_at >= revenue_since)
                .map(|b| b.total_amount)
                .sum::<Decimal>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::availability::TimeRange;
    use crate::models::{Role, SpaceStatus, SpaceType};
    use chrono::{Duration, TimeZone};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            role: Role::Client,
            is_verified: false,
            verification_token: None,
        }
    }

    fn listing() -> CreateSpace {
        CreateSpace {
            name: "Atelier".into(),
            description: "North light".into(),
            address: "9 Hill Rd".into(),
            city: "Kisumu".into(),
            state: "Kisumu".into(),
            country: "Kenya".into(),
            postal_code: "40100".into(),
            space_type: SpaceType::Studio,
            capacity: 4,
            price_per_hour: Decimal::from(35),
            price_per_day: Decimal::from(250),
            amenities: vec![],
            rules: None,
        }
    }

    fn new_booking(space_id: Uuid, from_hour: i64, hours: i64) -> NewBooking {
        let start = Utc.with_ymd_and_hms(2030, 5, 1, 8, 0, 0).unwrap() + Duration::hours(from_hour);
        NewBooking {
            space_id,
            client_id: Uuid::new_v4(),
            range: TimeRange::new(start, start + Duration::hours(hours)).unwrap(),
            special_requests: None,
        }
    }

    fn confirm(id: Uuid) -> TransitionBooking {
        TransitionBooking {
            booking_id: id,
            target: BookingStatus::Confirmed,
            cancellation_reason: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_keeps_single_user() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@example.com")).await.unwrap();
        let second = UserRepository::create(&store, new_user("a@example.com")).await;

        assert!(matches!(second, Err(AppError::Conflict(_))));
        let page = UserRepository::list(&store, UserFilter::default(), PageParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_transition_updates_booking_and_space_together() {
        let store = MemoryStore::new();
        let space = SpaceRepository::create(&store, Uuid::new_v4(), listing()).await.unwrap();
        let booking = BookingRepository::create(&store, new_booking(space.id, 0, 2)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_amount, Decimal::from(70));

        let outcome = store.transition(confirm(booking.id)).await.unwrap();
        assert_eq!(outcome.booking.status, BookingStatus::Confirmed);
        assert_eq!(outcome.space_status, SpaceStatus::Booked);

        let stored = SpaceRepository::find_by_id(&store, space.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SpaceStatus::Booked);
    }

    #[tokio::test]
    async fn test_failed_transition_changes_nothing() {
        let store = MemoryStore::new();
        let space = SpaceRepository::create(&store, Uuid::new_v4(), listing()).await.unwrap();
        let first = BookingRepository::create(&store, new_booking(space.id, 0, 4)).await.unwrap();
        let second = BookingRepository::create(&store, new_booking(space.id, 2, 4)).await.unwrap();

        store.transition(confirm(first.id)).await.unwrap();
        let clash = store.transition(confirm(second.id)).await;
        assert!(matches!(clash, Err(AppError::Conflict(_))));

        let second = BookingRepository::find_by_id(&store, second.id).await.unwrap().unwrap();
        assert_eq!(second.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_space_edit_rederives_status() {
        let store = MemoryStore::new();
        let space = SpaceRepository::create(&store, Uuid::new_v4(), listing()).await.unwrap();
        let booking = BookingRepository::create(&store, new_booking(space.id, 0, 1)).await.unwrap();
        store.transition(confirm(booking.id)).await.unwrap();

        let changes = SpaceChanges {
            status: Some(SpaceStatus::Maintenance),
            ..Default::default()
        };
        let space = SpaceRepository::update(&store, space.id, changes).await.unwrap();
        assert_eq!(space.status, SpaceStatus::Maintenance);

        let changes = SpaceChanges {
            status: Some(SpaceStatus::Available),
            ..Default::default()
        };
        let space = SpaceRepository::update(&store, space.id, changes).await.unwrap();
        assert_eq!(space.status, SpaceStatus::Booked);
    }

    #[tokio::test]
    async fn test_testimonial_requires_existing_space() {
        let store = MemoryStore::new();
        let result = TestimonialRepository::create(
            &store,
            Uuid::new_v4(),
            CreateTestimonial {
                space_id: Uuid::new_v4(),
                rating: 5,
                comment: "Lovely".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_count_confirmed_revenue() {
        let store = MemoryStore::new();
        let space = SpaceRepository::create(&store, Uuid::new_v4(), listing()).await.unwrap();
        let kept = BookingRepository::create(&store, new_booking(space.id, 0, 2)).await.unwrap();
        BookingRepository::create(&store, new_booking(space.id, 4, 2)).await.unwrap();
        store.transition(confirm(kept.id)).await.unwrap();

        let stats = store
            .platform_stats(Utc::now() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(stats.total_spaces, 1);
        assert_eq!(stats.total_bookings, 2);
        assert_eq!(stats.active_bookings, 1);
        assert_eq!(stats.revenue_last_30_days, Decimal::from(70));
    }
}
