use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::fetch_page;
use super::spaces::lock_space;
use crate::engine::{plan_booking, plan_transition};
use crate::models::booking::TransitionBooking;
use crate::models::{Booking, BookingFilter, BookingStatus, BookingTransition, NewBooking};
use crate::repository::BookingRepository;
use crate::utils::{AppError, AppResult, Page, PageParams};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn confirmed_in(tx: &mut Transaction<'_, Postgres>, space_id: Uuid) -> AppResult<Vec<Booking>> {
    Ok(sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE space_id = $1 AND status = $2 ORDER BY start_time",
    )
    .bind(space_id)
    .bind(BookingStatus::Confirmed)
    .fetch_all(&mut **tx)
    .await?)
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, request: NewBooking) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;
        // Holding the space row serializes bookings against confirmations.
        let space = lock_space(&mut tx, request.space_id).await?;
        let confirmed = confirmed_in(&mut tx, space.id).await?;
        let total_amount = plan_booking(&space, &request, &confirmed)?;

        let booking = request.into_booking(total_amount, Utc::now());
        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, space_id, client_id, start_time, end_time, status, total_amount,
                 payment_status, payment_reference, special_requests,
                 cancellation_reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(booking.id)
        .bind(booking.space_id)
        .bind(booking.client_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status)
        .bind(booking.total_amount)
        .bind(booking.payment_status)
        .bind(&booking.payment_reference)
        .bind(&booking.special_requests)
        .bind(&booking.cancellation_reason)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, filter: BookingFilter, page: PageParams) -> AppResult<Page<Booking>> {
        fetch_page(
            &self.pool,
            "bookings",
            |qb| {
                if let Some(status) = filter.status {
                    qb.push(" AND status = ").push_bind(status);
                }
                if let Some(client_id) = filter.client_id {
                    qb.push(" AND client_id = ").push_bind(client_id);
                }
                if let Some(space_id) = filter.space_id {
                    qb.push(" AND space_id = ").push_bind(space_id);
                }
            },
            page,
        )
        .await
    }

    async fn confirmed_for_space(&self, space_id: Uuid) -> AppResult<Vec<Booking>> {
        Ok(sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE space_id = $1 AND status = $2 ORDER BY start_time",
        )
        .bind(space_id)
        .bind(BookingStatus::Confirmed)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn transition(&self, change: TransitionBooking) -> AppResult<BookingTransition> {
        let mut tx = self.pool.begin().await?;
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(change.booking_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Booking", change.booking_id))?;
        let space = lock_space(&mut tx, booking.space_id).await?;
        let confirmed = confirmed_in(&mut tx, space.id).await?;
        let space_status = plan_transition(&booking, &space, change.target, &confirmed)?;

        let now = Utc::now();
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2,
                cancellation_reason = COALESCE($3, cancellation_reason),
                updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(change.target)
        .bind(&change.cancellation_reason)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE spaces SET status = $2, updated_at = $3 WHERE id = $1 AND status <> $2")
            .bind(space.id)
            .bind(space_status)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(BookingTransition {
            booking,
            space_status,
        })
    }
}
