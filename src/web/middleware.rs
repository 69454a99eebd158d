//! Web middleware
//!
//! Authentication middleware validates the credential cookies against the
//! backend's profile endpoint on each request, then stashes the resolved
//! user in request extensions for handlers. Role middleware layers on top
//! for the patient-only and therapist-only routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::{AuthConfig, UploadConfig};
use crate::flow::InFlightCancels;
use crate::models::{AuthenticatedUser, Role};
use crate::render::{RenderError, TemplateEngine};
use crate::state;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub templates: Arc<TemplateEngine>,
    pub auth_config: Arc<AuthConfig>,
    pub upload_config: Arc<UploadConfig>,
    pub cancels: InFlightCancels,
}

/// Resolved identity of the requesting user, carried in request extensions
/// by the auth middleware. The bearer token rides along because handlers
/// need it for their own backend calls.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: AuthenticatedUser,
    pub token: String,
}

/// Extractor for public pages that adapt to login state; always succeeds.
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Error rendered to the browser when a page cannot be produced.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            // expired or missing credentials: back to the login page
            PageError::Unauthorized => Redirect::to("/auth").into_response(),
            PageError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, error_panel("Access denied", &message)).into_response()
            }
            PageError::Backend(err) => {
                let status = match &err {
                    BackendError::Status { status, .. } => StatusCode::from_u16(*status)
                        .unwrap_or(StatusCode::BAD_GATEWAY),
                    BackendError::Network(_) => StatusCode::BAD_GATEWAY,
                    BackendError::UnexpectedPayload(_) => StatusCode::BAD_GATEWAY,
                };
                tracing::error!("Backend error: {}", err);
                (
                    status,
                    error_panel("Something went wrong", &err.to_string()),
                )
                    .into_response()
            }
            PageError::Render(err) => {
                tracing::error!("Render error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_panel("Something went wrong", "The page could not be displayed."),
                )
                    .into_response()
            }
            PageError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, error_panel("Invalid request", &message)).into_response()
            }
        }
    }
}

/// Minimal self-contained error page, used when the template engine itself
/// may be the thing that failed.
fn error_panel(title: &str, message: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{title}</title></head>
<body>
  <div class="error-panel">
    <h1>{title}</h1>
    <p>{message}</p>
    <p><a href="/">Back to home</a></p>
  </div>
</body>
</html>"#,
        title = tera::escape_html(title),
        message = tera::escape_html(message),
    ))
}

/// Resolve the credential cookies into a [`CurrentUser`], validating the
/// token against the backend. `None` means not logged in or token expired.
/// Takes headers rather than the request so the future stays `Send` while
/// the request body sits in the middleware frame.
async fn resolve_user(backend: &BackendClient, headers: &HeaderMap) -> Option<CurrentUser> {
    let credentials = state::read_credentials(headers)?;
    match backend.fetch_profile(&credentials.token).await {
        Ok(profile) => Some(CurrentUser {
            user: AuthenticatedUser {
                id: credentials.user_id,
                role: credentials.role,
                display_name: profile.username,
                email: profile.email,
                avatar: credentials.avatar,
            },
            token: credentials.token,
        }),
        Err(err) => {
            if !err.is_unauthorized() {
                tracing::warn!("Profile validation failed: {}", err);
            }
            None
        }
    }
}

/// Authentication middleware for pages that require a logged-in user.
pub async fn require_auth(
    State(app): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, PageError> {
    let user = resolve_user(&app.backend, request.headers())
        .await
        .ok_or(PageError::Unauthorized)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Best-effort authentication for public pages that adapt to login state.
pub async fn optional_auth(
    State(app): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = resolve_user(&app.backend, request.headers()).await {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Patient-only routes; layered after [`require_auth`].
pub async fn require_patient(request: Request, next: Next) -> Result<Response, PageError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(PageError::Unauthorized)?;
    if user.user.role != Role::Patient {
        return Err(PageError::Forbidden(
            "This page is only available to patients".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

/// Therapist-only routes; layered after [`require_auth`].
pub async fn require_therapist(request: Request, next: Next) -> Result<Response, PageError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(PageError::Unauthorized)?;
    if user.user.role != Role::Therapist {
        return Err(PageError::Forbidden(
            "This page is only available to therapists".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_panel_escapes_html() {
        let Html(body) = error_panel("Oops", "<script>alert(1)</script>");
        assert!(!body.contains("<script>alert(1)</script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_unauthorized_redirects_to_auth() {
        let response = PageError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/auth");
    }

    #[test]
    fn test_resolve_user_future_is_send() {
        // tokio needs Send futures; a non-Send resolve_user would make the
        // auth middleware unusable as a layer
        fn assert_send<T: Send>(_: T) {}
        let backend = BackendClient::new("http://localhost:1");
        let headers = HeaderMap::new();
        assert_send(resolve_user(&backend, &headers));
    }

    #[tokio::test]
    async fn test_backend_status_passthrough() {
        let err = PageError::Backend(BackendError::Status {
            status: 404,
            message: "Not found".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
