use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use super::model::{MfaCheck, User};
use crate::modules::response::ErrorResponse;
use crate::services::mailer::MailError;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

pub type Result<T> = std::result::Result<T, AuthError>;

/// Persistence for credentials, MFA codes and OTP state.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Exact, case-sensitive match on the stored email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_practitioner_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Upserts the pending code for `email`, replacing any earlier one.
    async fn save_mfa_code(&self, email: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Checks `code` and, when accepted, overwrites it with the consumed
    /// sentinel in the same unit of work.
    async fn consume_mfa_code(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<MfaCheck>;

    async fn set_otp(&self, user_id: &str, otp_hash: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Clears the OTP and marks the email verified, but only if the stored
    /// digest is still `expected_otp_hash`. Returns whether it applied.
    async fn complete_otp_verification(&self, user_id: &str, expected_otp_hash: &str) -> Result<bool>;

    /// Swaps the password hash only if it still equals `expected_hash`.
    async fn replace_password_hash(&self, user_id: &str, expected_hash: &str, new_hash: &str) -> Result<bool>;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidCredential(&'static str),

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("{0}")]
    Expired(&'static str),

    #[error("{0}")]
    PolicyViolation(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidState(_) => StatusCode::FORBIDDEN,
            Self::Expired(_) => StatusCode::BAD_REQUEST,
            Self::PolicyViolation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "auth request failed");
            "Something went wrong, please try again later".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "auth request rejected");
            self.to_string()
        };

        ErrorResponse::new(status, message).into_response()
    }
}
