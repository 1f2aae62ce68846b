use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::{require_roles, RoleGate, ADMIN_ONLY, LISTING_MANAGERS};
use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{admin, auth, bookings, health_check, spaces, testimonials, users};
use crate::state::AppState;

/// Routes any caller may reach. Handlers that need an identity take
/// `AuthUser` and answer 401 on their own.
fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/update-password", post(auth::update_password))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/spaces", get(spaces::list_spaces))
        .route(
            "/spaces/:id",
            get(spaces::get_space)
                .put(spaces::update_space)
                .delete(spaces::delete_space),
        )
        .route("/spaces/:id/availability", get(spaces::space_availability))
        .route("/spaces/:id/bookings", get(spaces::space_bookings))
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/status", put(bookings::update_booking_status))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .route(
            "/testimonials",
            get(testimonials::list_testimonials).post(testimonials::create_testimonial),
        )
        .route(
            "/testimonials/:id",
            axum::routing::delete(testimonials::delete_testimonial),
        )
}

fn listing_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/spaces", post(spaces::create_space))
        .route("/spaces/owner", get(spaces::owner_spaces))
        .route_layer(from_fn_with_state(
            RoleGate::new(state.clone(), LISTING_MANAGERS),
            require_roles,
        ))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/:id",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/spaces", get(admin::list_spaces))
        .route("/spaces/:id", put(admin::update_space))
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/:id", put(admin::update_booking))
        .route("/testimonials", get(admin::list_testimonials))
        .route("/testimonials/:id", put(admin::moderate_testimonial))
        .route("/stats", get(admin::stats))
        .route_layer(from_fn_with_state(
            RoleGate::new(state.clone(), ADMIN_ONLY),
            require_roles,
        ))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .merge(open_routes())
        .merge(listing_routes(&state))
        .nest("/admin", admin_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_origins))
        .with_state(state)
}
