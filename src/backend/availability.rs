//! Availability endpoints

use super::{BackendClient, BackendError};
use crate::models::Availability;
use chrono::NaiveDate;

impl BackendClient {
    pub async fn therapist_availability(
        &self,
        therapist_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Availability>, BackendError> {
        let path = match date {
            Some(date) => format!(
                "/availabilities/?therapist_id={}&date={}",
                therapist_id,
                date.format("%Y-%m-%d")
            ),
            None => format!("/availabilities/?therapist_id={}", therapist_id),
        };
        self.get_json(&path, None).await
    }

    pub async fn get_availability(&self, id: &str) -> Result<Availability, BackendError> {
        self.get_json(&format!("/availabilities/{}/", id), None)
            .await
    }
}
