//! Payment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment record as returned by `GET /payments/?patient_id=...` or
/// `?therapist_id=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub session_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Successful,
    Unsuccessful,
    Waived,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::Successful => write!(f, "successful"),
            PaymentStatus::Unsuccessful => write!(f, "unsuccessful"),
            PaymentStatus::Waived => write!(f, "waived"),
        }
    }
}
