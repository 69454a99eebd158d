//! Therapist endpoints

use super::{BackendClient, BackendError};
use crate::models::{CalendarSessions, Therapist, TherapistPatientSummary};
use serde::{Deserialize, Serialize};

/// Editable subset of the therapist profile (`PUT /therapists/{id}`).
#[derive(Debug, Clone, Serialize)]
pub struct TherapistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_of_expertise: Option<String>,
}

/// Response of the profile picture upload.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePictureResponse {
    pub profile_picture: String,
}

impl BackendClient {
    pub async fn list_therapists(&self) -> Result<Vec<Therapist>, BackendError> {
        self.get_json("/therapists/", None).await
    }

    pub async fn get_therapist(&self, id: &str) -> Result<Therapist, BackendError> {
        self.get_json(&format!("/therapists/{}", id), None).await
    }

    pub async fn update_therapist(
        &self,
        token: &str,
        id: &str,
        update: &TherapistUpdate,
    ) -> Result<Therapist, BackendError> {
        self.put_json(&format!("/therapists/{}", id), Some(token), update)
            .await
    }

    /// Month calendar feed, pre-bucketed by date on the backend side.
    pub async fn calendar_sessions(
        &self,
        token: &str,
        therapist_id: &str,
        year: i32,
        month: u32,
    ) -> Result<CalendarSessions, BackendError> {
        self.get_json(
            &format!(
                "/therapists/{}/calendar_sessions/?year={}&month={}",
                therapist_id, year, month
            ),
            Some(token),
        )
        .await
    }

    /// Patient roster for the therapist dashboard.
    pub async fn therapist_patients(
        &self,
        token: &str,
        therapist_id: &str,
    ) -> Result<Vec<TherapistPatientSummary>, BackendError> {
        self.get_json(
            &format!("/therapists/{}/patients/", therapist_id),
            Some(token),
        )
        .await
    }

    /// Forward an already-validated image to the backend's profile picture
    /// endpoint. The field name `image` is what the backend expects.
    pub async fn upload_profile_picture(
        &self,
        token: &str,
        therapist_id: &str,
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    ) -> Result<ProfilePictureResponse, BackendError> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| BackendError::UnexpectedPayload(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);
        self.post_multipart(
            &format!("/therapists/{}/profile-picture", therapist_id),
            Some(token),
            form,
        )
        .await
    }
}
