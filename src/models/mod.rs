//! Domain models
//!
//! Read-only copies of backend-owned entities, fetched on view mount and
//! discarded on navigation. The backend is authoritative for every field;
//! nothing here is persisted locally.

pub mod availability;
pub mod patient;
pub mod payment;
pub mod review;
pub mod session;
pub mod therapist;
pub mod user;

pub use availability::Availability;
pub use patient::{Patient, TherapistPatientSummary};
pub use payment::{Payment, PaymentStatus};
pub use review::{NewReview, Review};
pub use session::{CalendarSession, CalendarSessions, Session, SessionStatus};
pub use therapist::Therapist;
pub use user::{AuthenticatedUser, Role};
