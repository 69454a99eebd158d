//! Authentication endpoints

use super::{BackendClient, BackendError};
use serde::{Deserialize, Serialize};

/// User object embedded in patient auth responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl AuthUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Response of `POST /auth/login/` and `POST /auth/signup/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientAuthResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: AuthUser,
}

/// Response of `POST /therapist-login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TherapistAuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub therapist: AuthUser,
}

/// Minimal profile echoed by `GET /auth/profile/`. The backend only returns
/// the account fields here, not the role or id, which is why those are kept
/// client-side after login.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_no: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct PasswordChangeRequest<'a> {
    password: &'a str,
}

impl BackendClient {
    pub async fn patient_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PatientAuthResponse, BackendError> {
        self.post_json("/auth/login/", None, &LoginRequest { email, password })
            .await
    }

    pub async fn patient_signup(
        &self,
        request: &SignupRequest,
    ) -> Result<PatientAuthResponse, BackendError> {
        self.post_json("/auth/signup/", None, request).await
    }

    pub async fn therapist_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TherapistAuthResponse, BackendError> {
        self.post_json("/therapist-login/", None, &LoginRequest { email, password })
            .await
    }

    /// Validates the bearer token; a 401 means the stored token has expired
    /// or was revoked.
    pub async fn fetch_profile(&self, token: &str) -> Result<ProfileResponse, BackendError> {
        self.get_json("/auth/profile/", Some(token)).await
    }

    pub async fn change_patient_password(
        &self,
        token: &str,
        patient_id: &str,
        password: &str,
    ) -> Result<serde_json::Value, BackendError> {
        self.put_json(
            &format!("/patients/{}/password", patient_id),
            Some(token),
            &PasswordChangeRequest { password },
        )
        .await
    }
}
