use rand::Rng;

/// bcrypt work factor for stored passwords and OTP digests.
pub const HASH_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// A malformed stored hash counts as a mismatch rather than an error, so a
/// corrupted row can never be used to enumerate accounts.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            false
        }
    }
}

/// Six-digit numeric code, uniform over `[100000, 999999]`.
pub fn generate_numeric_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}
