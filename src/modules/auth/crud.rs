use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::interface::{CredentialStore, Result};
use super::model::{evaluate_mfa_code, MfaCheck, MfaCode, User, CONSUMED_CODE, PRACTITIONER_USER_TYPE};

const USER_COLUMNS: &str = r#"
    SELECT u.id, u.email, u.password_hash, u.name, u.disabled, u.email_verified,
           u.otp_hash, u.otp_hash_expires_at, m.user_type, u.created_at, u.updated_at
    FROM users u
    LEFT JOIN user_metadata m ON m.user_id = u.id
"#;

/// MySQL-backed [`CredentialStore`].
pub struct UserCrud {
    pool: Pool<MySql>,
}

impl UserCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for UserCrud {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE u.id = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        // users.email uses a binary collation, so this is case-sensitive
        let sql = format!("{} WHERE u.email = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_practitioner_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE u.email = ? AND m.user_type = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(PRACTITIONER_USER_TYPE)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn save_mfa_code(&self, email: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mfa_codes (email, code, expires_at)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                code = VALUES(code),
                expires_at = VALUES(expires_at)
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_mfa_code(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<MfaCheck> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, MfaCode>(
            "SELECT email, code, expires_at FROM mfa_codes WHERE email = ? FOR UPDATE",
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;

        let check = evaluate_mfa_code(record.as_ref(), code, now);

        if check == MfaCheck::Accepted {
            sqlx::query("UPDATE mfa_codes SET code = ?, expires_at = ? WHERE email = ?")
                .bind(CONSUMED_CODE)
                .bind(now)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(check)
    }

    async fn set_otp(&self, user_id: &str, otp_hash: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE users SET otp_hash = ?, otp_hash_expires_at = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(otp_hash)
        .bind(expires_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn complete_otp_verification(&self, user_id: &str, expected_otp_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET otp_hash = NULL, otp_hash_expires_at = NULL, email_verified = TRUE, updated_at = NOW()
            WHERE id = ? AND otp_hash = ?
            "#,
        )
        .bind(user_id)
        .bind(expected_otp_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn replace_password_hash(&self, user_id: &str, expected_hash: &str, new_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = NOW() WHERE id = ? AND password_hash = ?",
        )
        .bind(new_hash)
        .bind(user_id)
        .bind(expected_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
