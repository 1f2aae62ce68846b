//! Storage seams.
//!
//! Handlers and the booking engine only see these traits. Every method that
//! writes runs as one unit of work: either everything it touched is committed
//! or nothing is.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::TransitionBooking;
use crate::models::space::CreateSpace;
use crate::models::testimonial::CreateTestimonial;
use crate::models::user::{AdminUpdateUser, NewUser, UpdateProfile, UserFilter};
use crate::models::{
    Booking, BookingFilter, BookingTransition, NewBooking, PlatformStats, Space, SpaceChanges,
    SpaceFilter, Testimonial, TestimonialFilter, TestimonialStatus, User,
};
use crate::utils::{AppResult, Page, PageParams};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_verification_token(&self, token: &str) -> AppResult<Option<User>>;
    async fn list(&self, filter: UserFilter, page: PageParams) -> AppResult<Page<User>>;
    async fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<User>;
    async fn admin_update(&self, id: Uuid, changes: AdminUpdateUser) -> AppResult<User>;
    async fn set_verification_token(&self, id: Uuid, token: Option<String>) -> AppResult<()>;
    /// Marks the account verified and clears its token.
    async fn mark_verified(&self, id: Uuid) -> AppResult<User>;
    /// Stores a new hash and clears any outstanding token.
    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;
    async fn deactivate(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait SpaceRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, space: CreateSpace) -> AppResult<Space>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Space>>;
    async fn list(&self, filter: SpaceFilter, page: PageParams) -> AppResult<Page<Space>>;
    /// Applies `changes` and re-derives the status against confirmed bookings
    /// in the same unit of work.
    async fn update(&self, id: Uuid, changes: SpaceChanges) -> AppResult<Space>;
    /// Soft delete: the row stays for historical bookings.
    async fn deactivate(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Prices and inserts a pending booking after checking the space is active
    /// and the range is free.
    async fn create(&self, booking: NewBooking) -> AppResult<Booking>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;
    async fn list(&self, filter: BookingFilter, page: PageParams) -> AppResult<Page<Booking>>;
    async fn confirmed_for_space(&self, space_id: Uuid) -> AppResult<Vec<Booking>>;
    /// Moves a booking and synchronizes its space's status in one unit of work.
    async fn transition(&self, change: TransitionBooking) -> AppResult<BookingTransition>;
}

#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, testimonial: CreateTestimonial) -> AppResult<Testimonial>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Testimonial>>;
    async fn list(&self, filter: TestimonialFilter, page: PageParams) -> AppResult<Page<Testimonial>>;
    async fn moderate(&self, id: Uuid, decision: TestimonialStatus) -> AppResult<Testimonial>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn platform_stats(&self, revenue_since: DateTime<Utc>) -> AppResult<PlatformStats>;
}

/// The full set of stores a running server needs.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub spaces: Arc<dyn SpaceRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub testimonials: Arc<dyn TestimonialRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            spaces: Arc::new(postgres::PgSpaceRepository::new(pool.clone())),
            bookings: Arc::new(postgres::PgBookingRepository::new(pool.clone())),
            testimonials: Arc::new(postgres::PgTestimonialRepository::new(pool.clone())),
            stats: Arc::new(postgres::PgStatsRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            spaces: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            testimonials: Arc::new(store.clone()),
            stats: Arc::new(store),
        }
    }
}
