//! Session cancellation workflow
//!
//! The cancel flow walks a fixed state machine: the user opens the form,
//! types a reason, submits, and lands on a success or failure screen. A
//! failed submission keeps the reason so the user can retry. At most one
//! cancellation request per session may be in flight at a time; re-entrant
//! submits are ignored rather than queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Longest accepted cancellation reason, in characters.
pub const MAX_REASON_LEN: usize = 500;

/// State of one cancellation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelState {
    /// Form not yet opened
    Idle,
    /// User is composing the reason
    ReasonEntry { reason: String },
    /// Request sent, awaiting the backend
    Submitting { reason: String },
    /// Backend confirmed the cancellation
    Succeeded { refund_processed: bool },
    /// Backend rejected or the request failed; the reason is kept for retry
    Failed { reason: String, message: String },
}

impl CancelState {
    pub fn new() -> Self {
        CancelState::Idle
    }

    /// Open the form, moving from `Idle` to `ReasonEntry`.
    pub fn open(&mut self) {
        if matches!(self, CancelState::Idle) {
            *self = CancelState::ReasonEntry {
                reason: String::new(),
            };
        }
    }

    /// Replace the draft reason. Returns false (leaving the state untouched)
    /// when the input exceeds [`MAX_REASON_LEN`] characters or the flow is
    /// not accepting edits.
    pub fn set_reason(&mut self, reason: &str) -> bool {
        if reason.chars().count() > MAX_REASON_LEN {
            return false;
        }
        match self {
            CancelState::ReasonEntry { reason: r } | CancelState::Failed { reason: r, .. } => {
                *r = reason.to_string();
                true
            }
            _ => false,
        }
    }

    /// Move to `Submitting`, carrying the current reason. Returns the reason
    /// to send, or `None` when no submission is possible from this state
    /// (already submitting, already succeeded, or the form was never opened).
    pub fn begin_submit(&mut self) -> Option<String> {
        match self {
            CancelState::ReasonEntry { reason } | CancelState::Failed { reason, .. } => {
                let reason = reason.clone();
                *self = CancelState::Submitting {
                    reason: reason.clone(),
                };
                Some(reason)
            }
            _ => None,
        }
    }

    /// Record the backend's confirmation.
    pub fn complete(&mut self, refund_processed: bool) {
        if matches!(self, CancelState::Submitting { .. }) {
            *self = CancelState::Succeeded { refund_processed };
        }
    }

    /// Record a failed submission, keeping the reason for resubmission.
    pub fn fail(&mut self, message: String) {
        if let CancelState::Submitting { reason } = self {
            *self = CancelState::Failed {
                reason: reason.clone(),
                message,
            };
        }
    }
}

impl Default for CancelState {
    fn default() -> Self {
        CancelState::new()
    }
}

/// Tracks which sessions currently have a cancellation request in flight.
/// Acquiring a guard for a session already in the set fails, which is how
/// double-submits collapse to a single backend call.
#[derive(Debug, Clone, Default)]
pub struct InFlightCancels {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl InFlightCancels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the in-flight slot for a session. Returns `None` when a
    /// request for that session is already running.
    pub fn try_acquire(&self, session_id: &str) -> Option<InFlightGuard> {
        let mut set = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if set.insert(session_id.to_string()) {
            Some(InFlightGuard {
                set: Arc::clone(&self.inner),
                session_id: session_id.to_string(),
            })
        } else {
            None
        }
    }
}

/// Releases the in-flight slot on drop.
pub struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    session_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = CancelState::new();
        state.open();
        assert!(state.set_reason("Schedule conflict"));
        let reason = state.begin_submit().unwrap();
        assert_eq!(reason, "Schedule conflict");
        state.complete(true);
        assert_eq!(
            state,
            CancelState::Succeeded {
                refund_processed: true
            }
        );
    }

    #[test]
    fn test_reason_length_limit() {
        let mut state = CancelState::new();
        state.open();
        let too_long = "x".repeat(MAX_REASON_LEN + 1);
        assert!(!state.set_reason(&too_long));
        // state unchanged, still accepts a valid reason
        let at_limit = "x".repeat(MAX_REASON_LEN);
        assert!(state.set_reason(&at_limit));
    }

    #[test]
    fn test_reason_limit_counts_chars_not_bytes() {
        let mut state = CancelState::new();
        state.open();
        // 500 multibyte characters are within the limit
        let multibyte = "é".repeat(MAX_REASON_LEN);
        assert!(state.set_reason(&multibyte));
    }

    #[test]
    fn test_reentrant_submit_ignored() {
        let mut state = CancelState::new();
        state.open();
        state.set_reason("reason");
        assert!(state.begin_submit().is_some());
        // second submit while in flight produces nothing
        assert!(state.begin_submit().is_none());
    }

    #[test]
    fn test_failed_keeps_reason_and_allows_retry() {
        let mut state = CancelState::new();
        state.open();
        state.set_reason("reason");
        state.begin_submit();
        state.fail("backend unavailable".to_string());

        match &state {
            CancelState::Failed { reason, message } => {
                assert_eq!(reason, "reason");
                assert_eq!(message, "backend unavailable");
            }
            other => panic!("unexpected state {:?}", other),
        }

        assert_eq!(state.begin_submit().as_deref(), Some("reason"));
        state.complete(false);
        assert_eq!(
            state,
            CancelState::Succeeded {
                refund_processed: false
            }
        );
    }

    #[test]
    fn test_cannot_submit_before_open() {
        let mut state = CancelState::new();
        assert!(state.begin_submit().is_none());
        assert!(!state.set_reason("reason"));
    }

    #[test]
    fn test_in_flight_single_slot() {
        let cancels = InFlightCancels::new();
        let guard = cancels.try_acquire("SES_1");
        assert!(guard.is_some());
        assert!(cancels.try_acquire("SES_1").is_none());
        // other sessions unaffected
        assert!(cancels.try_acquire("SES_2").is_some());
        drop(guard);
        assert!(cancels.try_acquire("SES_1").is_some());
    }
}
