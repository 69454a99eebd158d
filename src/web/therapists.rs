//! Therapist directory, booking and reviews

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use super::middleware::{AppState, CurrentUser, MaybeUser, PageError};
use crate::backend::sessions::BookingRequest;
use crate::models::{Availability, NewReview, Therapist};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Free-text filter over name and area of expertise
    pub q: Option<String>,
}

pub async fn list(
    State(app): State<AppState>,
    MaybeUser(current): MaybeUser,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, PageError> {
    let mut therapists = app.backend.list_therapists().await?;

    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let needle = q.trim().to_lowercase();
        therapists.retain(|t| matches_filter(t, &needle));
    }

    let mut context = TeraContext::new();
    context.insert("therapists", &therapists);
    context.insert("query", &query.q);
    let html = app.templates.render_page(
        "therapist_list.html",
        current.as_ref().map(|c| &c.user),
        "/therapists",
        &context,
    )?;
    Ok(Html(html))
}

fn matches_filter(therapist: &Therapist, needle: &str) -> bool {
    therapist.full_name().to_lowercase().contains(needle)
        || therapist
            .area_of_expertise
            .as_deref()
            .is_some_and(|area| area.to_lowercase().contains(needle))
}

pub async fn detail(
    State(app): State<AppState>,
    MaybeUser(current): MaybeUser,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let (therapist, reviews, availability) = tokio::join!(
        app.backend.get_therapist(&id),
        app.backend.therapist_reviews(&id),
        app.backend.therapist_availability(&id, None),
    );

    // primary: the therapist themselves
    let therapist = therapist?;
    let reviews = reviews.unwrap_or_else(|err| {
        tracing::warn!("Reviews feed unavailable: {}", err);
        Vec::new()
    });
    let availability: Vec<Availability> = availability.unwrap_or_else(|err| {
        tracing::warn!("Availability feed unavailable: {}", err);
        Vec::new()
    });

    let mut context = TeraContext::new();
    context.insert("therapist", &therapist);
    context.insert("reviews", &reviews);
    context.insert("availability", &availability);
    context.insert(
        "is_patient",
        &current.as_ref().is_some_and(|c| c.user.is_patient()),
    );

    let path = format!("/therapists/{}", id);
    let html = app.templates.render_page(
        "therapist_detail.html",
        current.as_ref().map(|c| &c.user),
        &path,
        &context,
    )?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub availability_id: String,
}

/// Booking confirmation page. A slot that got taken since the listing page
/// was rendered sends the user back to the therapist page.
pub async fn book_confirm(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(query): Query<BookQuery>,
) -> Result<Response, PageError> {
    let (therapist, slot) = tokio::join!(
        app.backend.get_therapist(&id),
        app.backend.get_availability(&query.availability_id),
    );
    let therapist = therapist?;
    let slot = slot?;

    if !slot.is_open() || slot.therapist_id != id {
        return Ok(Redirect::to(&format!("/therapists/{}?taken=1", id)).into_response());
    }

    let mut context = TeraContext::new();
    context.insert("therapist", &therapist);
    context.insert("slot", &slot);
    let path = format!("/therapists/{}/book", id);
    let html =
        app.templates
            .render_page("book_confirm.html", Some(&current.user), &path, &context)?;
    Ok(Html(html).into_response())
}

#[derive(Debug, Deserialize)]
pub struct BookForm {
    pub availability_id: String,
}

pub async fn book_submit(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Result<Response, PageError> {
    // re-check the slot right before booking
    let slot = app.backend.get_availability(&form.availability_id).await?;
    if !slot.is_open() || slot.therapist_id != id {
        return Ok(Redirect::to(&format!("/therapists/{}?taken=1", id)).into_response());
    }

    let start_hour = slot.start_hour().ok_or_else(|| {
        PageError::BadRequest(format!("Unrecognized time slot '{}'", slot.time_slot))
    })?;
    let start = slot
        .date
        .and_hms_opt(start_hour, 0, 0)
        .ok_or_else(|| PageError::BadRequest("Invalid slot start time".to_string()))?;

    let request = BookingRequest {
        availability_id: slot.id.clone(),
        therapist_id: id.clone(),
        patient_id: current.user.id.clone(),
        scheduled_start_datetime: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
        duration: 60,
    };

    let session = app.backend.book_session(&current.token, &request).await?;
    tracing::info!(session_id = %session.id, therapist_id = %id, "session booked");
    Ok(Redirect::to("/dashboard/patient").into_response())
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

pub async fn submit_review(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, PageError> {
    if !NewReview::is_valid_score(form.score) {
        return Err(PageError::BadRequest(
            "Score must be between 0 and 10 in half-point steps".to_string(),
        ));
    }

    let review = NewReview {
        therapist_id: id.clone(),
        patient_id: current.user.id.clone(),
        score: form.score,
        comment: Some(form.comment.trim().to_string()).filter(|c| !c.is_empty()),
    };
    app.backend.create_review(&current.token, &review).await?;
    Ok(Redirect::to(&format!("/therapists/{}", id)).into_response())
}
