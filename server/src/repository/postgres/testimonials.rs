use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::fetch_page;
use crate::models::testimonial::CreateTestimonial;
use crate::models::{Testimonial, TestimonialFilter, TestimonialStatus};
use crate::repository::TestimonialRepository;
use crate::utils::{AppError, AppResult, Page, PageParams};

pub struct PgTestimonialRepository {
    pool: PgPool,
}

impl PgTestimonialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestimonialRepository for PgTestimonialRepository {
    async fn create(&self, user_id: Uuid, request: CreateTestimonial) -> AppResult<Testimonial> {
        let space_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM spaces WHERE id = $1)")
            .bind(request.space_id)
            .fetch_one(&self.pool)
            .await?;
        if !space_exists {
            return Err(AppError::not_found("Space", request.space_id));
        }

        let testimonial = request.into_testimonial(user_id, Utc::now());
        sqlx::query(
            r#"
            INSERT INTO testimonials
                (id, user_id, space_id, rating, comment, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(testimonial.id)
        .bind(testimonial.user_id)
        .bind(testimonial.space_id)
        .bind(testimonial.rating)
        .bind(&testimonial.comment)
        .bind(testimonial.status)
        .bind(testimonial.created_at)
        .bind(testimonial.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(testimonial)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Testimonial>> {
        Ok(sqlx::query_as::<_, Testimonial>("SELECT * FROM testimonials WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, filter: TestimonialFilter, page: PageParams) -> AppResult<Page<Testimonial>> {
        fetch_page(
            &self.pool,
            "testimonials",
            |qb| {
                if let Some(status) = filter.status {
                    qb.push(" AND status = ").push_bind(status);
                }
                if let Some(space_id) = filter.space_id {
                    qb.push(" AND space_id = ").push_bind(space_id);
                }
            },
            page,
        )
        .await
    }

    async fn moderate(&self, id: Uuid, decision: TestimonialStatus) -> AppResult<Testimonial> {
        let mut tx = self.pool.begin().await?;
        let current = sqlx::query_as::<_, Testimonial>("SELECT * FROM testimonials WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Testimonial", id))?;
        let status = current.status.moderate(decision)?;

        let updated = sqlx::query_as::<_, Testimonial>(
            "UPDATE testimonials SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Testimonial", id));
        }
        Ok(())
    }
}
