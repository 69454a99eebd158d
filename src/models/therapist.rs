//! Therapist model

use serde::{Deserialize, Serialize};

/// Therapist profile as returned by `GET /therapists/` and
/// `GET /therapists/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Therapist {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub about_note: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub area_of_expertise: Option<String>,
    #[serde(default)]
    pub verified_certificates: Option<String>,
    #[serde(default)]
    pub years_active: Option<u32>,
    /// Mean of review scores, 0-10
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub wallet_balance: Option<f64>,
    /// URL of the profile picture, if uploaded
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl Therapist {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Average score formatted to one decimal place, or a dash when the
    /// therapist has no reviews yet.
    pub fn display_score(&self) -> String {
        match self.average_score {
            Some(score) => format!("{:.1}", score),
            None => "-".to_string(),
        }
    }
}
