//! Patient models

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Patient profile as returned by `GET /patients/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    /// ISO date of birth
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years as of today, if a birth date is on file.
    pub fn age(&self) -> Option<u32> {
        self.age_at(Utc::now().date_naive())
    }

    fn age_at(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

/// Roster entry for the therapist dashboard
/// (`GET /therapists/{id}/patients/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistPatientSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// ISO date of the most recent completed session, if any
    #[serde(default)]
    pub last_session_date: Option<String>,
    #[serde(default)]
    pub session_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}
