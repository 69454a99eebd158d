//! Multi-step user workflows

pub mod cancel;

pub use cancel::{CancelState, InFlightCancels, InFlightGuard, MAX_REASON_LEN};
