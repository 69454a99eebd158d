//! Account settings
//!
//! Profile edits go straight through to the backend resource for the user's
//! role. Avatar uploads are validated here (type and size) before being
//! forwarded, and a successful upload replaces the avatar cookie so the
//! navigation picture updates immediately.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use super::middleware::{AppState, CurrentUser, PageError};
use crate::backend::patients::PatientUpdate;
use crate::backend::therapists::TherapistUpdate;
use crate::models::Role;
use crate::state;

pub async fn page(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, PageError> {
    let mut context = TeraContext::new();
    let template = match current.user.role {
        Role::Patient => {
            let patient = app
                .backend
                .get_patient(&current.token, &current.user.id)
                .await?;
            context.insert("patient", &patient);
            "settings_patient.html"
        }
        Role::Therapist => {
            let therapist = app.backend.get_therapist(&current.user.id).await?;
            context.insert("therapist", &therapist);
            context.insert(
                "max_upload_mb",
                &(app.upload_config.max_file_size / (1024 * 1024)),
            );
            "settings_therapist.html"
        }
    };

    let html = app
        .templates
        .render_page(template, Some(&current.user), "/settings", &context)?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    pub about_note: Option<String>,
    pub education: Option<String>,
    pub area_of_expertise: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn update_profile(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<ProfileForm>,
) -> Result<Response, PageError> {
    match current.user.role {
        Role::Patient => {
            let update = PatientUpdate {
                first_name: non_empty(form.first_name),
                last_name: non_empty(form.last_name),
                phone_no: non_empty(form.phone_no),
                email: non_empty(form.email),
            };
            app.backend
                .update_patient(&current.token, &current.user.id, &update)
                .await?;
        }
        Role::Therapist => {
            let update = TherapistUpdate {
                phone_no: non_empty(form.phone_no),
                about_note: non_empty(form.about_note),
                education: non_empty(form.education),
                area_of_expertise: non_empty(form.area_of_expertise),
            };
            app.backend
                .update_therapist(&current.token, &current.user.id, &update)
                .await?;
        }
    }
    tracing::info!(user_id = %current.user.id, "profile updated");
    Ok(Redirect::to("/profile").into_response())
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub password: String,
    pub password_confirm: String,
}

pub async fn change_password(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<PasswordForm>,
) -> Result<Response, PageError> {
    if current.user.role != Role::Patient {
        return Err(PageError::Forbidden(
            "Password changes are only available to patients".to_string(),
        ));
    }
    if form.password.len() < 8 {
        return Err(PageError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if form.password != form.password_confirm {
        return Err(PageError::BadRequest("Passwords do not match".to_string()));
    }

    app.backend
        .change_patient_password(&current.token, &current.user.id, &form.password)
        .await?;
    tracing::info!(user_id = %current.user.id, "password changed");
    Ok(Redirect::to("/settings").into_response())
}

/// Therapist profile picture upload. The file is validated against the
/// configured type and size limits, then forwarded to the backend as-is.
pub async fn upload_avatar(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Response, PageError> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PageError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("avatar").to_string();
        let content_type = field
            .content_type()
            .ok_or_else(|| PageError::BadRequest("Missing file content type".to_string()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| PageError::BadRequest(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| PageError::BadRequest("No image file provided".to_string()))?;

    if !app.upload_config.is_type_allowed(&content_type) {
        return Err(PageError::BadRequest(format!(
            "File type '{}' is not allowed",
            content_type
        )));
    }
    if data.len() as u64 > app.upload_config.max_file_size {
        return Err(PageError::BadRequest(format!(
            "File exceeds the {} MB limit",
            app.upload_config.max_file_size / (1024 * 1024)
        )));
    }

    let result = app
        .backend
        .upload_profile_picture(&current.token, &current.user.id, file_name, content_type, data)
        .await?;
    tracing::info!(user_id = %current.user.id, "profile picture updated");

    let mut response = Redirect::to("/profile").into_response();
    let cookie = state::avatar_cookie(&result.profile_picture, app.auth_config.token_ttl_days);
    let value = header::HeaderValue::from_str(&cookie)
        .map_err(|e| PageError::BadRequest(format!("Invalid avatar URL: {}", e)))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}
