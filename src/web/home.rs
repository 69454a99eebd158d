//! Landing page

use axum::{extract::State, response::Html};
use tera::Context as TeraContext;

use super::middleware::{AppState, MaybeUser, PageError};

pub async fn index(
    State(app): State<AppState>,
    MaybeUser(current): MaybeUser,
) -> Result<Html<String>, PageError> {
    let html = app.templates.render_page(
        "home.html",
        current.as_ref().map(|c| &c.user),
        "/",
        &TeraContext::new(),
    )?;
    Ok(Html(html))
}
