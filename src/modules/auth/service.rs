use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::Url;
use std::sync::Arc;

use super::interface::{AuthError, CredentialStore, Result};
use super::model::{code_expiry, contains_ignore_case, MfaCheck, User, CODE_TTL_MINUTES};
use crate::config::AppEnvironment;
use crate::services::hashing;
use crate::services::jwt::{JwtService, TokenPair};
use crate::services::link_signer::LinkSigner;
use crate::services::mailer::{Mailer, OutgoingEmail};

/// Settings fixed at construction time.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub environment: AppEnvironment,
    /// Frontend origin the practitioner link points at.
    pub app_base_url: String,
    /// Rejects verification requests that carry no link signature.
    pub require_signed_link: bool,
}

/// A freshly authenticated user and its tokens.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

/// Where the client should go after OTP verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextScreen {
    PractitionerLogin,
    Dashboard,
}

impl NextScreen {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PractitionerLogin => "practitioner-login",
            Self::Dashboard => "dashboard",
        }
    }
}

/// Credential and session issuance: password + MFA for regular users, the
/// emailed link for practitioners, OTP email verification, refresh and
/// password reset.
pub struct IdentityFlow {
    store: Arc<dyn CredentialStore>,
    mailer: Arc<dyn Mailer>,
    jwt: Arc<JwtService>,
    links: LinkSigner,
    settings: FlowSettings,
}

impl IdentityFlow {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
        jwt: Arc<JwtService>,
        links: LinkSigner,
        settings: FlowSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            jwt,
            links,
            settings,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    // =========================================================================
    // PASSWORD + MFA
    // =========================================================================

    /// Checks the password and emails a fresh MFA code. Reveals nothing about
    /// the user on success.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound("User not found"))?;

        ensure_enabled(&user)?;

        let valid = match user.password_hash.as_deref() {
            Some(hash) => hashing::verify_password(password, hash),
            None => false,
        };
        if !valid {
            tracing::info!(user_id = %user.id, "sign-in rejected: wrong password");
            return Err(AuthError::InvalidCredential("Invalid email or password"));
        }

        let code = hashing::generate_numeric_code();
        let expires_at = code_expiry(Utc::now());
        self.store.save_mfa_code(&user.email, &code, expires_at).await?;

        self.mailer.send(&OutgoingEmail::mfa_code(&user.email, &code)).await?;

        tracing::info!(user_id = %user.id, "mfa code issued");
        Ok(())
    }

    /// Consumes the MFA code before the user is re-read, so a replay of the
    /// same code can never mint a second session.
    pub async fn verify_mfa_code(&self, email: &str, code: &str) -> Result<Session> {
        match self.store.consume_mfa_code(email, code, Utc::now()).await? {
            MfaCheck::Accepted => {}
            MfaCheck::Missing => return Err(AuthError::NotFound("No pending verification code")),
            MfaCheck::Mismatch => return Err(AuthError::InvalidCredential("Invalid verification code")),
            MfaCheck::Expired => return Err(AuthError::Expired("Verification code has expired")),
        }

        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound("User not found"))?;
        ensure_enabled(&user)?;

        tracing::info!(user_id = %user.id, "mfa code verified");
        self.open_session(user)
    }

    // =========================================================================
    // PRACTITIONER LINK
    // =========================================================================

    pub async fn practitioner_sign_in(&self, email: &str) -> Result<()> {
        let user = self
            .store
            .find_practitioner_by_email(email)
            .await?
            .ok_or(AuthError::NotFound("Practitioner not found"))?;

        ensure_enabled(&user)?;
        if !user.email_verified {
            return Err(AuthError::InvalidState("Email address is not verified"));
        }

        let link = self.practitioner_link(&user.email, Utc::now().timestamp_millis())?;
        self.mailer
            .send(&OutgoingEmail::practitioner_link(&user.email, link.as_str()))
            .await?;

        tracing::info!(user_id = %user.id, "practitioner login link sent");
        Ok(())
    }

    /// `{app_base_url}/practitioner/verify?email=..&timestamp=..&signature=..`
    pub fn practitioner_link(&self, email: &str, timestamp: i64) -> Result<Url> {
        let signature = self.links.sign(email, timestamp);
        let base = format!("{}/practitioner/verify", self.settings.app_base_url);

        Url::parse_with_params(
            &base,
            &[
                ("email", email.to_string()),
                ("timestamp", timestamp.to_string()),
                ("signature", signature),
            ],
        )
        .map_err(|e| AuthError::Internal(format!("invalid APP_BASE_URL: {}", e)))
    }

    pub async fn practitioner_login_verification(
        &self,
        email: &str,
        timestamp: i64,
        signature: Option<&str>,
    ) -> Result<Session> {
        match signature {
            Some(signature) if !self.links.verify(email, timestamp, signature) => {
                return Err(AuthError::InvalidCredential("Invalid login link"));
            }
            None if self.settings.require_signed_link => {
                return Err(AuthError::InvalidCredential("Login link signature is required"));
            }
            _ => {}
        }

        if self.settings.environment.is_production() && link_expired(timestamp, Utc::now()) {
            return Err(AuthError::Expired("Login link has expired"));
        }

        let user = self
            .store
            .find_practitioner_by_email(email)
            .await?
            .ok_or(AuthError::NotFound("Practitioner not found"))?;
        ensure_enabled(&user)?;

        tracing::info!(user_id = %user.id, "practitioner link verified");
        self.open_session(user)
    }

    // =========================================================================
    // OTP (EMAIL VERIFICATION)
    // =========================================================================

    pub async fn issue_otp(&self, email: &str) -> Result<()> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound("User not found"))?;
        ensure_enabled(&user)?;

        let otp = hashing::generate_numeric_code();
        let otp_hash = hashing::hash_password(&otp)?;
        self.store
            .set_otp(&user.id, &otp_hash, code_expiry(Utc::now()))
            .await?;

        self.mailer.send(&OutgoingEmail::otp(&user.email, &otp)).await?;

        tracing::info!(user_id = %user.id, "otp issued");
        Ok(())
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<(Session, NextScreen)> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound("User not found"))?;
        ensure_enabled(&user)?;

        let otp_hash = user
            .otp_hash
            .clone()
            .ok_or(AuthError::NotFound("No pending one-time password"))?;

        match user.otp_hash_expires_at {
            Some(expires_at) if Utc::now() <= expires_at => {}
            _ => return Err(AuthError::Expired("One-time password has expired")),
        }

        if !hashing::verify_password(otp, &otp_hash) {
            return Err(AuthError::InvalidCredential("Invalid one-time password"));
        }

        if !self.store.complete_otp_verification(&user.id, &otp_hash).await? {
            return Err(AuthError::NotFound("No pending one-time password"));
        }

        let user = self
            .store
            .find_by_id(&user.id)
            .await?
            .ok_or(AuthError::NotFound("User not found"))?;

        let screen = if user.is_practitioner() {
            NextScreen::PractitionerLogin
        } else {
            NextScreen::Dashboard
        };

        tracing::info!(user_id = %user.id, "otp verified");
        Ok((self.open_session(user)?, screen))
    }

    // =========================================================================
    // TOKENS + PASSWORD
    // =========================================================================

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self
            .jwt
            .verify_refresh_token(refresh_token)
            .map_err(|_| AuthError::Unauthorized("Invalid refresh token"))?;

        let user = self
            .store
            .find_by_id(&claims.id)
            .await?
            .ok_or(AuthError::Unauthorized("Invalid refresh token"))?;
        ensure_enabled(&user)?;

        Ok(self.jwt.issue_pair(&user.id, &user.email)?)
    }

    /// Existing tokens stay valid until they expire.
    pub async fn reset_password(&self, user_id: &str, old_password: &str, new_password: &str) -> Result<()> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound("User not found"))?;
        ensure_enabled(&user)?;

        check_password_policy(new_password, &user)?;

        let current_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredential("Old password is incorrect"))?;
        if !hashing::verify_password(old_password, current_hash) {
            return Err(AuthError::InvalidCredential("Old password is incorrect"));
        }

        let new_hash = hashing::hash_password(new_password)?;
        if !self
            .store
            .replace_password_hash(&user.id, current_hash, &new_hash)
            .await?
        {
            // changed by a concurrent reset between our read and write
            return Err(AuthError::InvalidCredential("Old password is incorrect"));
        }

        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }

    fn open_session(&self, user: User) -> Result<Session> {
        let tokens = self.jwt.issue_pair(&user.id, &user.email)?;
        Ok(Session { user, tokens })
    }
}

fn ensure_enabled(user: &User) -> Result<()> {
    if user.disabled {
        tracing::info!(user_id = %user.id, "rejected disabled account");
        return Err(AuthError::InvalidState("Account is disabled"));
    }
    Ok(())
}

/// Rejects passwords that contain the account email or display name.
pub fn check_password_policy(new_password: &str, user: &User) -> Result<()> {
    if contains_ignore_case(new_password, &user.email) || contains_ignore_case(new_password, &user.name) {
        return Err(AuthError::PolicyViolation(
            "Password must not contain your email or name",
        ));
    }
    Ok(())
}

/// A timestamp from the future counts as zero elapsed time.
pub fn link_expired(timestamp_ms: i64, now: DateTime<Utc>) -> bool {
    let Some(issued_at) = Utc.timestamp_millis_opt(timestamp_ms).single() else {
        return true;
    };
    now - issued_at > Duration::minutes(CODE_TTL_MINUTES)
}
