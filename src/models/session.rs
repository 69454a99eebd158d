//! Session model
//!
//! A scheduled therapy appointment between a patient and a therapist.
//! Status transitions are backend-authoritative; the front-end never mutates
//! a session locally except by refreshing after a confirmed cancel call.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Minutes before the scheduled start at which the join affordance activates.
const JOIN_LEAD_MINUTES: i64 = 10;

/// Therapy session as returned by `GET /sessions/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: String,
    pub therapist_id: String,
    pub therapist_first_name: String,
    pub therapist_last_name: String,
    pub patient_id: String,
    pub patient_first_name: String,
    pub patient_last_name: String,
    /// Scheduled start, UTC
    pub scheduled_start_datetime: DateTime<Utc>,
    /// Duration in minutes, always > 0
    pub duration: u32,
    /// Session fee
    #[serde(default)]
    pub fee: f64,
    pub status: SessionStatus,
    /// Notes written by the therapist, if any
    #[serde(default)]
    pub therapist_notes: Option<String>,
    /// Rating left by the patient (0-10 in 0.5 steps), if any
    #[serde(default)]
    pub patient_rating: Option<f64>,
}

impl Session {
    /// Join affordance is active from 10 minutes before the scheduled start
    /// until start + duration, while the session is scheduled or commencing.
    pub fn is_join_active(&self, now: DateTime<Utc>) -> bool {
        let join_start = self.scheduled_start_datetime - Duration::minutes(JOIN_LEAD_MINUTES);
        let join_end = self.scheduled_start_datetime + Duration::minutes(self.duration as i64);
        join_start <= now
            && now <= join_end
            && matches!(
                self.status,
                SessionStatus::Scheduled | SessionStatus::Commencing
            )
    }
}

/// Session status, enumerated by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Commencing,
    Completed,
    Cancelled,
    #[serde(rename = "no_show")]
    NoShow,
}

impl SessionStatus {
    /// Terminal statuses can never be cancelled, regardless of timing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Scheduled => write!(f, "scheduled"),
            SessionStatus::Commencing => write!(f, "commencing"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
            SessionStatus::NoShow => write!(f, "no_show"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "commencing" => Ok(SessionStatus::Commencing),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "no_show" | "no-show" => Ok(SessionStatus::NoShow),
            _ => Err(anyhow::anyhow!("Invalid session status: {}", s)),
        }
    }
}

/// One entry of the therapist calendar feed
/// (`GET /therapists/{id}/calendar_sessions/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSession {
    pub id: String,
    pub patient_name: String,
    pub patient_id: String,
    /// Start time as `HH:MM`
    pub start_time: String,
    /// Duration in minutes
    pub duration: u32,
    pub status: SessionStatus,
    #[serde(default)]
    pub fee: f64,
}

impl CalendarSession {
    /// Parse the `HH:MM` start time into (hour, minute).
    pub fn start_parts(&self) -> Option<(u32, u32)> {
        let (h, m) = self.start_time.split_once(':')?;
        Some((h.parse().ok()?, m.parse().ok()?))
    }
}

/// Payload of the therapist calendar feed, pre-bucketed by ISO date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSessions {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM-DD` -> sessions scheduled that day, in backend order
    #[serde(default)]
    pub sessions: BTreeMap<String, Vec<CalendarSession>>,
}
