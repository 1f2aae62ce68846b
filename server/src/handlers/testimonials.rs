use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::testimonial::CreateTestimonial;
use crate::models::{TestimonialFilter, TestimonialStatus};
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::{AppError, AppJson, AppPath, AppQuery, AppResult, PageParams};

#[derive(Debug, Default, Deserialize)]
pub struct PublicTestimonialQuery {
    pub space_id: Option<Uuid>,
}

/// Only approved testimonials are public.
pub async fn list_testimonials(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(query): AppQuery<PublicTestimonialQuery>,
) -> AppResult<Response> {
    let filter = TestimonialFilter {
        status: Some(TestimonialStatus::Approved),
        space_id: query.space_id,
    };
    let testimonials = state.testimonials.list(filter, page).await?;
    Ok(success(testimonials, "Testimonials retrieved"))
}

pub async fn create_testimonial(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppJson(body): AppJson<CreateTestimonial>,
) -> AppResult<Response> {
    body.validate()?;
    let testimonial = state.testimonials.create(actor.user_id, body).await?;
    info!(testimonial_id = %testimonial.id, space_id = %testimonial.space_id, "Testimonial submitted");
    Ok(created(testimonial, "Testimonial submitted for review"))
}

pub async fn delete_testimonial(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Response> {
    let testimonial = state
        .testimonials
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Testimonial", id))?;
    if testimonial.user_id != actor.user_id {
        return Err(AppError::Forbidden(
            "Only the author may delete a testimonial".to_string(),
        ));
    }

    state.testimonials.delete(id).await?;
    Ok(empty_success("Testimonial deleted successfully"))
}
