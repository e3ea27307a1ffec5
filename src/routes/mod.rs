pub mod auth;
pub mod health;
pub mod interviews;
pub mod profiles;
pub mod shadowing;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::{middleware::auth::require_bearer_auth, AppState};

/// Public login routes plus the bearer-protected API. Transport layers
/// (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/auth/google", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/auth/token", post(auth::exchange_token));

    let api = Router::new()
        .route("/api/me", get(profiles::me))
        .route(
            "/api/profiles/by-email/:email",
            get(profiles::get_profile_by_email),
        )
        .route(
            "/api/interviews",
            get(interviews::list_interviews).post(interviews::create_interview),
        )
        .route(
            "/api/interviews/:id",
            get(interviews::get_interview)
                .put(interviews::update_interview)
                .delete(interviews::delete_interview),
        )
        .route(
            "/api/interviews/:id/shadowing-requests",
            get(shadowing::list_for_interview).post(shadowing::request_shadowing),
        )
        .route("/api/shadowing-requests/mine", get(shadowing::list_mine))
        .route("/api/shadowing-requests/:id/cancel", post(shadowing::cancel))
        .route(
            "/api/shadowing-requests/:id/approve",
            post(shadowing::approve),
        )
        .route("/api/shadowing-requests/:id/reject", post(shadowing::reject))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_auth));

    public.merge(api).with_state(state)
}
