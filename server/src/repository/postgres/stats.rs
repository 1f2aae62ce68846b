use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{BookingStatus, PlatformStats};
use crate::repository::StatsRepository;
use crate::utils::AppResult;

pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn platform_stats(&self, revenue_since: DateTime<Utc>) -> AppResult<PlatformStats> {
        Ok(sqlx::query_as::<_, PlatformStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM spaces) AS total_spaces,
                (SELECT COUNT(*) FROM bookings) AS total_bookings,
                (SELECT COUNT(*) FROM bookings WHERE status = $1) AS active_bookings,
                (SELECT COALESCE(SUM(total_amount), 0)
                   FROM bookings
                  WHERE status = $1 AND created_at >= $2) AS revenue_last_30_days
            "#,
        )
        .bind(BookingStatus::Confirmed)
        .bind(revenue_since)
        .fetch_one(&self.pool)
        .await?)
    }
}
