//! Review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review as returned by `GET /reviews/?therapist_id=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub therapist_id: String,
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    /// Score 0-10 in 0.5 steps
    pub score: f64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /reviews/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub therapist_id: String,
    pub patient_id: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewReview {
    /// Scores must lie in 0..=10 and land on a half-point step.
    pub fn is_valid_score(score: f64) -> bool {
        (0.0..=10.0).contains(&score) && (score * 2.0).fract() == 0.0
    }
}
