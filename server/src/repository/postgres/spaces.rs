use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::fetch_page;
use crate::engine::plan_space_status;
use crate::models::space::CreateSpace;
use crate::models::{BookingStatus, Space, SpaceChanges, SpaceFilter};
use crate::repository::SpaceRepository;
use crate::utils::{AppError, AppResult, Page, PageParams};

pub struct PgSpaceRepository {
    pool: PgPool,
}

impl PgSpaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(super) async fn lock_space(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<Space> {
    sqlx::query_as::<_, Space>("SELECT * FROM spaces WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::not_found("Space", id))
}

#[async_trait]
impl SpaceRepository for PgSpaceRepository {
    async fn create(&self, owner_id: Uuid, space: CreateSpace) -> AppResult<Space> {
        let space = space.into_space(owner_id, Utc::now());
        sqlx::query(
            r#"
            INSERT INTO spaces
                (id, owner_id, name, description, address, city, state, country,
                 postal_code, space_type, status, capacity, price_per_hour,
                 price_per_day, amenities, rules, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19)
            "#,
        )
        .bind(space.id)
        .bind(space.owner_id)
        .bind(&space.name)
        .bind(&space.description)
        .bind(&space.address)
        .bind(&space.city)
        .bind(&space.state)
        .bind(&space.country)
        .bind(&space.postal_code)
        .bind(space.space_type)
        .bind(space.status)
        .bind(space.capacity)
        .bind(space.price_per_hour)
        .bind(space.price_per_day)
        .bind(&space.amenities)
        .bind(&space.rules)
        .bind(space.is_active)
        .bind(space.created_at)
        .bind(space.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(space)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Space>> {
        Ok(sqlx::query_as::<_, Space>("SELECT * FROM spaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, filter: SpaceFilter, page: PageParams) -> AppResult<Page<Space>> {
        fetch_page(
            &self.pool,
            "spaces",
            |qb| {
                if !filter.include_inactive {
                    qb.push(" AND is_active");
                }
                if let Some(space_type) = filter.space_type {
                    qb.push(" AND space_type = ").push_bind(space_type);
                }
                if let Some(status) = filter.status {
                    qb.push(" AND status = ").push_bind(status);
                }
                if let Some(owner_id) = filter.owner_id {
                    qb.push(" AND owner_id = ").push_bind(owner_id);
                }
                if let Some(city) = &filter.city {
                    qb.push(" AND LOWER(city) = LOWER(")
                        .push_bind(city.trim().to_string())
                        .push(")");
                }
            },
            page,
        )
        .await
    }

    async fn update(&self, id: Uuid, changes: SpaceChanges) -> AppResult<Space> {
        let mut tx = self.pool.begin().await?;
        let mut space = lock_space(&mut tx, id).await?;
        let confirmed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE space_id = $1 AND status = $2")
                .bind(id)
                .bind(BookingStatus::Confirmed)
                .fetch_one(&mut *tx)
                .await?;

        let requested = changes.apply_to(&mut space);
        space.status = plan_space_status(space.status, requested, confirmed as usize);
        space.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE spaces
            SET name = $2, description = $3, address = $4, city = $5, state = $6,
                country = $7, postal_code = $8, space_type = $9, status = $10,
                capacity = $11, price_per_hour = $12, price_per_day = $13,
                amenities = $14, rules = $15, updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(space.id)
        .bind(&space.name)
        .bind(&space.description)
        .bind(&space.address)
        .bind(&space.city)
        .bind(&space.state)
        .bind(&space.country)
        .bind(&space.postal_code)
        .bind(space.space_type)
        .bind(space.status)
        .bind(space.capacity)
        .bind(space.price_per_hour)
        .bind(space.price_per_day)
        .bind(&space.amenities)
        .bind(&space.rules)
        .bind(space.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(space)
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE spaces SET is_active = FALSE, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Space", id));
        }
        Ok(())
    }
}
