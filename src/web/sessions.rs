//! Session history and cancellation
//!
//! The cancel flow is two pages: a form asking for the reason, then a result
//! page. Submission drives the workflow state machine and claims the
//! per-session in-flight slot, so a double-click on the submit button sends
//! exactly one request to the backend.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tera::Context as TeraContext;

use super::middleware::{AppState, CurrentUser, PageError};
use crate::calendar;
use crate::flow::{CancelState, MAX_REASON_LEN};
use crate::models::Session;

#[derive(Debug, Serialize)]
struct HistoryEntry {
    session: Session,
    cancellable: bool,
    join_active: bool,
}

/// Session history, most recent first.
pub async fn history(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, PageError> {
    let mut sessions = app
        .backend
        .patient_sessions(&current.token, &current.user.id)
        .await?;
    sessions.sort_by(|a, b| b.scheduled_start_datetime.cmp(&a.scheduled_start_datetime));

    let now = Utc::now();
    let entries: Vec<HistoryEntry> = sessions
        .into_iter()
        .map(|session| HistoryEntry {
            cancellable: calendar::is_cancellable(&session, now),
            join_active: session.is_join_active(now),
            session,
        })
        .collect();

    let mut context = TeraContext::new();
    context.insert("entries", &entries);
    let html = app.templates.render_page(
        "sessions.html",
        Some(&current.user),
        "/sessions",
        &context,
    )?;
    Ok(Html(html))
}

/// Fetch a session and confirm it belongs to the requesting patient.
async fn owned_session(
    app: &AppState,
    current: &CurrentUser,
    session_id: &str,
) -> Result<Session, PageError> {
    let session = app.backend.get_session(&current.token, session_id).await?;
    if session.patient_id != current.user.id {
        return Err(PageError::Forbidden(
            "This session belongs to another patient".to_string(),
        ));
    }
    Ok(session)
}

pub async fn cancel_form(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(session_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let session = owned_session(&app, &current, &session_id).await?;
    render_cancel_page(&app, &current, &session, &CancelState::ReasonEntry {
        reason: String::new(),
    })
}

#[derive(Debug, Deserialize)]
pub struct CancelForm {
    #[serde(default)]
    pub reason: String,
}

pub async fn cancel_submit(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(session_id): Path<String>,
    Form(form): Form<CancelForm>,
) -> Result<Response, PageError> {
    let session = owned_session(&app, &current, &session_id).await?;

    if !calendar::is_cancellable(&session, Utc::now()) {
        return Err(PageError::BadRequest(
            "This session can no longer be cancelled".to_string(),
        ));
    }

    let mut state = CancelState::new();
    state.open();
    if !state.set_reason(&form.reason) {
        return Err(PageError::BadRequest(format!(
            "Cancellation reason must be at most {} characters",
            MAX_REASON_LEN
        )));
    }

    // a request for this session is already running; drop this duplicate
    let Some(_guard) = app.cancels.try_acquire(&session_id) else {
        return Ok(Redirect::to(&format!("/sessions/{}/cancel", session_id)).into_response());
    };

    let reason = match state.begin_submit() {
        Some(reason) => reason,
        None => return Ok(Redirect::to("/sessions").into_response()),
    };

    match app
        .backend
        .cancel_session(&current.token, &session_id, &session.therapist_id, &reason)
        .await
    {
        Ok(outcome) => {
            tracing::info!(
                session_id = %session_id,
                refund_processed = outcome.refund_processed,
                "session cancelled"
            );
            state.complete(outcome.refund_processed);
        }
        Err(err) => {
            tracing::warn!(session_id = %session_id, "cancellation failed: {}", err);
            state.fail(err.to_string());
        }
    }

    Ok(render_cancel_page(&app, &current, &session, &state)?.into_response())
}

fn render_cancel_page(
    app: &AppState,
    current: &CurrentUser,
    session: &Session,
    state: &CancelState,
) -> Result<Html<String>, PageError> {
    let mut context = TeraContext::new();
    context.insert("session", session);
    context.insert("max_reason_len", &MAX_REASON_LEN);

    match state {
        CancelState::ReasonEntry { reason } => {
            context.insert("stage", "form");
            context.insert("reason", reason);
        }
        CancelState::Succeeded { refund_processed } => {
            context.insert("stage", "succeeded");
            context.insert("refund_processed", refund_processed);
        }
        CancelState::Failed { reason, message } => {
            context.insert("stage", "failed");
            context.insert("reason", reason);
            context.insert("error", message);
        }
        CancelState::Idle | CancelState::Submitting { .. } => {
            context.insert("stage", "form");
            context.insert("reason", "");
        }
    }

    let path = format!("/sessions/{}/cancel", session.id);
    let html =
        app.templates
            .render_page("cancel.html", Some(&current.user), &path, &context)?;
    Ok(Html(html))
}
