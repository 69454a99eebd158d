//! Login, signup and logout
//!
//! Successful logins set the full credential cookie set in one response;
//! logout clears it the same way. Failed logins re-render the auth page
//! with the backend's message instead of bouncing through a redirect.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use super::middleware::{AppState, MaybeUser, PageError};
use crate::backend::auth::SignupRequest;
use crate::models::Role;
use crate::state;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_no: String,
    pub password: String,
}

/// Auth page with the patient and therapist tabs. Logged-in users go
/// straight to their dashboard.
pub async fn page(
    State(app): State<AppState>,
    MaybeUser(current): MaybeUser,
) -> Result<Response, PageError> {
    if let Some(current) = &current {
        return Ok(Redirect::to(dashboard_path(current.user.role)).into_response());
    }
    let html = app
        .templates
        .render_page("auth.html", None, "/auth", &TeraContext::new())?;
    Ok(Html(html).into_response())
}

pub async fn patient_login(
    State(app): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match app.backend.patient_login(&form.email, &form.password).await {
        Ok(response) => {
            tracing::info!(user_id = %response.user.id, "patient logged in");
            Ok(login_response(
                &app,
                &response.access,
                &response.user.id,
                Role::Patient,
                response.user.profile_picture.as_deref(),
            ))
        }
        Err(err) if matches!(&err, crate::backend::BackendError::Status { .. }) => {
            auth_page_with_error(&app, "patient", &err.to_string())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn patient_signup(
    State(app): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    let request = SignupRequest {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        phone_no: form.phone_no,
        password: form.password,
    };
    match app.backend.patient_signup(&request).await {
        Ok(response) => {
            tracing::info!(user_id = %response.user.id, "patient signed up");
            Ok(login_response(
                &app,
                &response.access,
                &response.user.id,
                Role::Patient,
                response.user.profile_picture.as_deref(),
            ))
        }
        Err(err) if matches!(&err, crate::backend::BackendError::Status { .. }) => {
            auth_page_with_error(&app, "patient", &err.to_string())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn therapist_login(
    State(app): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match app
        .backend
        .therapist_login(&form.email, &form.password)
        .await
    {
        Ok(response) => {
            tracing::info!(user_id = %response.therapist.id, "therapist logged in");
            Ok(login_response(
                &app,
                &response.access_token,
                &response.therapist.id,
                Role::Therapist,
                response.therapist.profile_picture.as_deref(),
            ))
        }
        Err(err) if matches!(&err, crate::backend::BackendError::Status { .. }) => {
            auth_page_with_error(&app, "therapist", &err.to_string())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn logout() -> Result<Response, PageError> {
    let mut response = Redirect::to("/").into_response();
    for cookie in state::logout_cookies() {
        append_set_cookie(&mut response, &cookie)?;
    }
    Ok(response)
}

fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::Patient => "/dashboard/patient",
        Role::Therapist => "/dashboard/therapist",
    }
}

fn login_response(
    app: &AppState,
    token: &str,
    user_id: &str,
    role: Role,
    avatar: Option<&str>,
) -> Response {
    let mut response = Redirect::to(dashboard_path(role)).into_response();
    for cookie in state::login_cookies(token, user_id, role, avatar, app.auth_config.token_ttl_days)
    {
        if append_set_cookie(&mut response, &cookie).is_err() {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to set credentials",
            )
                .into_response();
        }
    }
    response
}

fn append_set_cookie(response: &mut Response, cookie: &str) -> Result<(), PageError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| PageError::BadRequest(format!("Invalid cookie value: {}", e)))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}

fn auth_page_with_error(app: &AppState, tab: &str, message: &str) -> Result<Response, PageError> {
    let mut context = TeraContext::new();
    context.insert("error", message);
    context.insert("active_tab", tab);
    let html = app.templates.render_page("auth.html", None, "/auth", &context)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
}
