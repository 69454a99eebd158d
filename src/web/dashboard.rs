//! Patient and therapist dashboards
//!
//! Each dashboard issues its backend fetches concurrently. The primary feed
//! decides the page: if it fails, the error page is shown. Secondary feeds
//! (payments, reviews, roster) degrade to empty sections with a warning in
//! the log so one flaky endpoint does not take the whole dashboard down.

use axum::{
    extract::{Query, State},
    response::Html,
    Extension,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tera::Context as TeraContext;

use super::middleware::{AppState, CurrentUser, PageError};
use crate::calendar::{
    self, MonthGrid, SlotGeometry, PIXELS_PER_HOUR, WINDOW_END_HOUR, WINDOW_START_HOUR,
};
use crate::models::{CalendarSession, Payment, Review, Session, TherapistPatientSummary};

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// Zero-based month index; values past 11 roll into later years
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Selected day for the day view, `YYYY-MM-DD`
    pub day: Option<String>,
}

/// Upcoming session with its derived affordances, ready for the template.
#[derive(Debug, Serialize)]
struct SessionView {
    session: Session,
    join_active: bool,
    cancellable: bool,
}

pub async fn patient_dashboard(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, PageError> {
    let (sessions, payments) = tokio::join!(
        app.backend.patient_sessions(&current.token, &current.user.id),
        app.backend.patient_payments(&current.token, &current.user.id),
    );

    // primary feed: a failure here is the page's failure
    let mut sessions = sessions?;
    let payments: Vec<Payment> = payments.unwrap_or_else(|err| {
        tracing::warn!("Payments feed unavailable: {}", err);
        Vec::new()
    });

    let now = Utc::now();
    sessions.sort_by_key(|s| s.scheduled_start_datetime);
    let upcoming: Vec<SessionView> = sessions
        .into_iter()
        .filter(|s| !s.status.is_terminal() && s.scheduled_start_datetime + chrono::Duration::minutes(s.duration as i64) >= now)
        .map(|session| SessionView {
            join_active: session.is_join_active(now),
            cancellable: calendar::is_cancellable(&session, now),
            session,
        })
        .collect();

    let mut context = TeraContext::new();
    context.insert("upcoming", &upcoming);
    context.insert("payments", &payments);
    context.insert("payments_empty", &payments.is_empty());

    let html = app.templates.render_page(
        "dashboard_patient.html",
        Some(&current.user),
        "/dashboard/patient",
        &context,
    )?;
    Ok(Html(html))
}

/// One rendered block on the day-view timeline.
#[derive(Debug, Serialize)]
struct DayBlock {
    session: CalendarSession,
    geometry: SlotGeometry,
}

pub async fn therapist_dashboard(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<CalendarQuery>,
) -> Result<Html<String>, PageError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month_index = query.month.unwrap_or(today.month0());

    let grid: MonthGrid = calendar::month_grid(year, month_index)
        .ok_or_else(|| PageError::BadRequest("Invalid calendar month".to_string()))?;

    let (feed, roster, reviews, profile) = tokio::join!(
        app.backend
            .calendar_sessions(&current.token, &current.user.id, grid.year, grid.month),
        app.backend.therapist_patients(&current.token, &current.user.id),
        app.backend.therapist_reviews(&current.user.id),
        app.backend.get_therapist(&current.user.id),
    );

    // primary feed
    let feed = feed?;

    // re-bucket the feed through the month filter: entries under malformed
    // or out-of-month keys are dropped, unpadded dates are normalized to
    // the zero-padded keys the grid cells use
    let dated: Vec<(NaiveDate, CalendarSession)> = feed
        .sessions
        .iter()
        .filter_map(|(day, sessions)| {
            day.parse::<NaiveDate>()
                .ok()
                .map(|date| (date, sessions.as_slice()))
        })
        .flat_map(|(date, sessions)| sessions.iter().map(move |s| (date, s.clone())))
        .collect();
    let sessions_by_day = calendar::bucket_sessions(grid.year, grid.month, &dated);

    let roster: Vec<TherapistPatientSummary> = roster.unwrap_or_else(|err| {
        tracing::warn!("Patient roster unavailable: {}", err);
        Vec::new()
    });
    let reviews: Vec<Review> = reviews.unwrap_or_else(|err| {
        tracing::warn!("Reviews feed unavailable: {}", err);
        Vec::new()
    });
    let wallet_balance = match profile {
        Ok(profile) => profile.wallet_balance,
        Err(err) => {
            tracing::warn!("Therapist profile unavailable: {}", err);
            None
        }
    };

    // day view for the selected date, defaulting to today when it falls in
    // the displayed month
    let selected_day = query.day.clone().or_else(|| {
        (today.year() == grid.year && today.month() == grid.month)
            .then(|| today.format("%Y-%m-%d").to_string())
    });
    let day_blocks: Vec<DayBlock> = selected_day
        .as_deref()
        .and_then(|day| sessions_by_day.get(day))
        .map(|sessions| {
            calendar::day_view_layout(sessions)
                .into_iter()
                .map(|(i, geometry)| DayBlock {
                    session: sessions[i].clone(),
                    geometry,
                })
                .collect()
        })
        .unwrap_or_default();

    // previous/next month links; index 0 steps back into December of the
    // prior year rather than producing a negative index
    let (prev_year, prev_month) = if month_index == 0 {
        (year - 1, 11)
    } else {
        (year, month_index - 1)
    };

    let mut context = TeraContext::new();
    context.insert("grid", &grid);
    context.insert("month_index", &month_index);
    context.insert("prev_year", &prev_year);
    context.insert("prev_month", &prev_month);
    context.insert("next_year", &year);
    context.insert("next_month", &(month_index + 1));
    context.insert("sessions_by_day", &sessions_by_day);
    context.insert("selected_day", &selected_day);
    context.insert("day_blocks", &day_blocks);
    context.insert("roster", &roster);
    context.insert("reviews", &reviews);
    context.insert("wallet_balance", &wallet_balance);
    context.insert("window_start_hour", &WINDOW_START_HOUR);
    context.insert("window_end_hour", &WINDOW_END_HOUR);
    context.insert("pixels_per_hour", &PIXELS_PER_HOUR);

    let html = app.templates.render_page(
        "dashboard_therapist.html",
        Some(&current.user),
        "/dashboard/therapist",
        &context,
    )?;
    Ok(Html(html))
}
