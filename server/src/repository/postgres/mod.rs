//! PostgreSQL implementations of the repository traits.
//!
//! Writes run inside one transaction each. Rows that a write depends on are
//! read with `FOR UPDATE`, so the checks in `crate::engine` see the same data
//! the write commits against.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::utils::{AppError, AppResult, Page, PageParams};

mod bookings;
mod spaces;
mod stats;
mod testimonials;
mod users;

pub use bookings::PgBookingRepository;
pub use spaces::PgSpaceRepository;
pub use stats::PgStatsRepository;
pub use testimonials::PgTestimonialRepository;
pub use users::PgUserRepository;

/// Runs a filtered, paginated listing over `table`. `filters` appends
/// `AND ...` clauses and is applied to both the count and the page query.
async fn fetch_page<T, F>(
    pool: &PgPool,
    table: &str,
    filters: F,
    page: PageParams,
) -> AppResult<Page<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    F: Fn(&mut QueryBuilder<'_, Postgres>),
{
    let mut count = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table} WHERE TRUE"));
    filters(&mut count);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::new(format!("SELECT * FROM {table} WHERE TRUE"));
    filters(&mut select);
    select
        .push(" ORDER BY created_at ASC, id ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let items = select.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page))
}

/// Turns a unique-constraint violation into the caller's conflict error.
fn on_unique_violation(err: sqlx::Error, conflict: impl FnOnce() -> AppError) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict(),
        _ => AppError::DatabaseError(err),
    }
}
