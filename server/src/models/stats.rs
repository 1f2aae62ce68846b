use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_spaces: i64,
    pub total_bookings: i64,
    /// Bookings currently in `confirmed`.
    pub active_bookings: i64,
    /// Sum of confirmed bookings created in the last 30 days.
    pub revenue_last_30_days: Decimal,
}
