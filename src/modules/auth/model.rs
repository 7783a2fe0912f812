use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// Validity window shared by MFA codes, OTPs and practitioner links.
pub const CODE_TTL_MINUTES: i64 = 10;

/// Written over a consumed MFA code; never equal to a six-digit code.
pub const CONSUMED_CODE: &str = "";

pub const PRACTITIONER_USER_TYPE: &str = "practitioner";

/// User row joined with its metadata `user_type`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub name: String,
    pub disabled: bool,
    pub email_verified: bool,
    pub otp_hash: Option<String>,
    pub otp_hash_expires_at: Option<DateTime<Utc>>,
    pub user_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_practitioner(&self) -> bool {
        self.user_type.as_deref() == Some(PRACTITIONER_USER_TYPE)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MfaCode {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of checking a submitted MFA code against the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaCheck {
    Accepted,
    Missing,
    Mismatch,
    Expired,
}

/// Order matters: existence, then value, then expiry.
pub fn evaluate_mfa_code(record: Option<&MfaCode>, submitted: &str, now: DateTime<Utc>) -> MfaCheck {
    let Some(record) = record else {
        return MfaCheck::Missing;
    };

    if record.code == CONSUMED_CODE {
        return MfaCheck::Missing;
    }

    if record.code != submitted {
        return MfaCheck::Mismatch;
    }

    if now > record.expires_at {
        return MfaCheck::Expired;
    }

    MfaCheck::Accepted
}

pub fn code_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(CODE_TTL_MINUTES)
}

/// True when `value` contains `needle` ignoring case; blank needles never match.
pub fn contains_ignore_case(value: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && value.to_lowercase().contains(&needle.to_lowercase())
}
