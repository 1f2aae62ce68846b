use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{fetch_page, on_unique_violation};
use crate::models::user::{AdminUpdateUser, NewUser, UpdateProfile, UserFilter};
use crate::models::User;
use crate::repository::UserRepository;
use crate::utils::{AppError, AppResult, Page, PageParams};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    async fn store(tx: &mut Transaction<'_, Postgres>, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, first_name = $4, last_name = $5,
                role = $6, is_verified = $7, verification_token = $8,
                phone_number = $9, profile_picture = $10, is_active = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.is_verified)
        .bind(&user.verification_token)
        .bind(&user.phone_number)
        .bind(&user.profile_picture)
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            on_unique_violation(e, || {
                AppError::Conflict(format!("Email '{}' is already registered", user.email))
            })
        })?;
        Ok(())
    }

    /// Loads the row under lock, lets `edit` change it and writes it back.
    async fn modify(&self, id: Uuid, edit: impl FnOnce(&mut User) + Send) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;
        let mut user = Self::lock(&mut tx, id).await?;
        edit(&mut user);
        user.updated_at = Utc::now();
        Self::store(&mut tx, &user).await?;
        tx.commit().await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let user = user.into_user(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, password_hash, first_name, last_name, role, is_verified,
                 verification_token, phone_number, profile_picture, is_active,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.is_verified)
        .bind(&user.verification_token)
        .bind(&user.phone_number)
        .bind(&user.profile_picture)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            on_unique_violation(e, || {
                AppError::Conflict(format!("Email '{}' is already registered", user.email))
            })
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_verification_token(&self, token: &str) -> AppResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE verification_token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list(&self, filter: UserFilter, page: PageParams) -> AppResult<Page<User>> {
        fetch_page(
            &self.pool,
            "users",
            |qb| {
                if let Some(role) = filter.role {
                    qb.push(" AND role = ").push_bind(role);
                }
            },
            page,
        )
        .await
    }

    async fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<User> {
        self.modify(id, move |user| changes.apply_to(user)).await
    }

    async fn admin_update(&self, id: Uuid, changes: AdminUpdateUser) -> AppResult<User> {
        self.modify(id, move |user| changes.apply_to(user)).await
    }

    async fn set_verification_token(&self, id: Uuid, token: Option<String>) -> AppResult<()> {
        self.modify(id, move |user| user.verification_token = token)
            .await
            .map(|_| ())
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<User> {
        self.modify(id, |user| {
            user.is_verified = true;
            user.verification_token = None;
        })
        .await
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        self.modify(id, move |user| {
            user.password_hash = password_hash;
            user.verification_token = None;
        })
        .await
        .map(|_| ())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        self.modify(id, |user| user.is_active = false)
            .await
            .map(|_| ())
    }
}
