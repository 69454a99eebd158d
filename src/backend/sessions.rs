//! Session endpoints

use super::{BackendClient, BackendError};
use crate::models::{Payment, Session};
use serde::{Deserialize, Serialize};

/// Payload for `POST /sessions/`. The fee is decided by the backend from the
/// therapist's rate; the booking only names the slot being claimed.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    pub availability_id: String,
    pub therapist_id: String,
    pub patient_id: String,
    pub scheduled_start_datetime: String,
    pub duration: u32,
}

#[derive(Debug, Serialize)]
struct CancelRequest<'a> {
    therapist_id: &'a str,
    reason: &'a str,
}

/// Response of `POST /sessions/{id}/cancel_session/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelResponse {
    #[serde(default)]
    pub refund_processed: bool,
}

impl BackendClient {
    /// Sessions filtered by patient. Backend returns newest-last; callers
    /// that want history order re-sort.
    pub async fn patient_sessions(
        &self,
        token: &str,
        patient_id: &str,
    ) -> Result<Vec<Session>, BackendError> {
        self.get_json(&format!("/sessions/?patient_id={}", patient_id), Some(token))
            .await
    }

    pub async fn get_session(&self, token: &str, id: &str) -> Result<Session, BackendError> {
        self.get_json(&format!("/sessions/{}/", id), Some(token))
            .await
    }

    pub async fn book_session(
        &self,
        token: &str,
        request: &BookingRequest,
    ) -> Result<Session, BackendError> {
        self.post_json("/sessions/", Some(token), request).await
    }

    /// One cancel call per invocation; eligibility is re-checked server-side
    /// and an in-window session comes back as a 400 with the backend's
    /// explanation.
    pub async fn cancel_session(
        &self,
        token: &str,
        session_id: &str,
        therapist_id: &str,
        reason: &str,
    ) -> Result<CancelResponse, BackendError> {
        self.post_json(
            &format!("/sessions/{}/cancel_session/", session_id),
            Some(token),
            &CancelRequest {
                therapist_id,
                reason,
            },
        )
        .await
    }

    pub async fn patient_payments(
        &self,
        token: &str,
        patient_id: &str,
    ) -> Result<Vec<Payment>, BackendError> {
        self.get_json(&format!("/payments/?patient_id={}", patient_id), Some(token))
            .await
    }
}
