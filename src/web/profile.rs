//! Profile page

use axum::{extract::State, response::Html, Extension};
use tera::Context as TeraContext;

use super::middleware::{AppState, CurrentUser, PageError};
use crate::models::Role;

/// Role-specific profile page backed by the matching backend resource.
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
            context.insert("age", &patient.age());
            context.insert("patient", &patient);
            "profile_patient.html"
        }
        Role::Therapist => {
            let therapist = app.backend.get_therapist(&current.user.id).await?;
            context.insert("therapist", &therapist);
            "profile_therapist.html"
        }
    };

    let html = app
        .templates
        .render_page(template, Some(&current.user), "/profile", &context)?;
    Ok(Html(html))
}
