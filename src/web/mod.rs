//! Web routes and handlers
//!
//! Route groups by access level: public pages get best-effort auth so the
//! navigation can adapt, patient and therapist areas are gated by role, and
//! the remaining account pages only need a valid login.

pub mod auth;
pub mod dashboard;
pub mod home;
pub mod middleware;
pub mod profile;
pub mod sessions;
pub mod settings;
pub mod static_files;
pub mod therapists;

pub use middleware::{AppState, CurrentUser, MaybeUser, PageError};

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

/// Build the application router.
pub fn create_router(app: AppState) -> Router {
    let public = Router::new()
        .route("/", get(home::index))
        .route("/auth", get(auth::page))
        .route("/auth/login", post(auth::patient_login))
        .route("/auth/signup", post(auth::patient_signup))
        .route("/auth/therapist-login", post(auth::therapist_login))
        .route("/auth/logout", post(auth::logout))
        .route("/therapists", get(therapists::list))
        .route("/therapists/{id}", get(therapists::detail))
        .layer(from_fn_with_state(app.clone(), middleware::optional_auth));

    let patient = Router::new()
        .route("/dashboard/patient", get(dashboard::patient_dashboard))
        .route("/sessions", get(sessions::history))
        .route(
            "/sessions/{id}/cancel",
            get(sessions::cancel_form).post(sessions::cancel_submit),
        )
        .route(
            "/therapists/{id}/book",
            get(therapists::book_confirm).post(therapists::book_submit),
        )
        .route("/therapists/{id}/reviews", post(therapists::submit_review))
        .layer(from_fn(middleware::require_patient))
        .layer(from_fn_with_state(app.clone(), middleware::require_auth));

    let therapist = Router::new()
        .route("/dashboard/therapist", get(dashboard::therapist_dashboard))
        .route("/settings/avatar", post(settings::upload_avatar))
        .layer(from_fn(middleware::require_therapist))
        .layer(from_fn_with_state(app.clone(), middleware::require_auth));

    let account = Router::new()
        .route("/profile", get(profile::page))
        .route(
            "/settings",
            get(settings::page).post(settings::update_profile),
        )
        .route("/settings/password", post(settings::change_password))
        .layer(from_fn_with_state(app.clone(), middleware::require_auth));

    // Leave headroom above the configured upload cap for multipart framing.
    let body_limit = app.upload_config.max_file_size as usize + 64 * 1024;

    Router::new()
        .merge(public)
        .merge(patient)
        .merge(therapist)
        .merge(account)
        .route("/static/{*path}", get(static_files::serve_static))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}
