use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::engine::BookingEngine;
use crate::mailer::Mailer;
use crate::repository::{
    BookingRepository, Repositories, SpaceRepository, StatsRepository, TestimonialRepository,
    UserRepository,
};

/// Shared handles every handler receives. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub spaces: Arc<dyn SpaceRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub testimonials: Arc<dyn TestimonialRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub engine: BookingEngine,
    pub tokens: Arc<TokenKeys>,
    pub mailer: Arc<dyn Mailer>,
    pub require_verified_email: bool,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        tokens: TokenKeys,
        mailer: Arc<dyn Mailer>,
        require_verified_email: bool,
    ) -> Self {
        let engine = BookingEngine::new(repos.bookings.clone(), repos.spaces.clone());
        Self {
            users: repos.users,
            spaces: repos.spaces,
            bookings: repos.bookings,
            testimonials: repos.testimonials,
            stats: repos.stats,
            engine,
            tokens: Arc::new(tokens),
            mailer,
            require_verified_email,
        }
    }
}
