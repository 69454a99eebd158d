//! Review endpoints

use super::{BackendClient, BackendError};
use crate::models::{NewReview, Review};

impl BackendClient {
    pub async fn therapist_reviews(
        &self,
        therapist_id: &str,
    ) -> Result<Vec<Review>, BackendError> {
        self.get_json(&format!("/reviews/?therapist_id={}", therapist_id), None)
            .await
    }

    pub async fn create_review(
        &self,
        token: &str,
        review: &NewReview,
    ) -> Result<Review, BackendError> {
        self.post_json("/reviews/", Some(token), review).await
    }
}
