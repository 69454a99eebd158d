//! Patient endpoints

use super::{BackendClient, BackendError};
use crate::models::Patient;
use serde::Serialize;

/// Editable subset of the patient profile (`PUT /patients/{id}`).
#[derive(Debug, Clone, Serialize)]
pub struct PatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl BackendClient {
    pub async fn get_patient(&self, token: &str, id: &str) -> Result<Patient, BackendError> {
        self.get_json(&format!("/patients/{}", id), Some(token))
            .await
    }

    pub async fn update_patient(
        &self,
        token: &str,
        id: &str,
        update: &PatientUpdate,
    ) -> Result<Patient, BackendError> {
        self.put_json(&format!("/patients/{}", id), Some(token), update)
            .await
    }
}
