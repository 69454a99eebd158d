//! Availability model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One bookable hour slot offered by a therapist
/// (`GET /availabilities/?therapist_id=...`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub id: String,
    pub therapist_id: String,
    pub date: NaiveDate,
    /// Hour slot label, unpadded, e.g. `8-9` or `21-22`
    pub time_slot: String,
    /// Populated once the slot has been booked
    #[serde(default)]
    pub session_id: Option<String>,
}

impl Availability {
    /// A slot is bookable while no session references it.
    pub fn is_open(&self) -> bool {
        self.session_id.is_none()
    }

    /// Starting hour of the slot, parsed from the label.
    pub fn start_hour(&self) -> Option<u32> {
        let (start, _) = self.time_slot.split_once('-')?;
        start.parse().ok()
    }
}
