//! Account service — registration, password login, profile details.
//!
//! DESIGN
//! ======
//! Passwords are stored as a random per-user salt plus an iterated SHA-256
//! digest. Login failures are counted per normalized email by
//! `LoginThrottle`; unknown emails and wrong passwords produce the same
//! error so the endpoint does not reveal which accounts exist.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use time::Date;
use uuid::Uuid;

use crate::rate_limit::{LoginThrottle, LoginThrottled};
use crate::services::session::{self, bytes_to_hex};
use crate::validation::{self, RegistrationForm, ValidationError};

const PASSWORD_ITERATIONS: u32 = 10_000;
const SALT_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Throttled(#[from] LoginThrottled),
    #[error("user not found")]
    NotFound,
    #[error("invalid date of birth")]
    InvalidDateOfBirth,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// PASSWORDS
// =============================================================================

#[must_use]
pub fn generate_salt() -> String {
    let bytes: [u8; SALT_LEN] = rand::random();
    bytes_to_hex(&bytes)
}

/// Iterated, salted SHA-256 of `password`, hex encoded.
#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut digest = Sha256::new().chain_update(salt.as_bytes()).chain_update(password.as_bytes()).finalize();
    for _ in 1..PASSWORD_ITERATIONS {
        digest = Sha256::new().chain_update(digest).chain_update(salt.as_bytes()).finalize();
    }
    bytes_to_hex(&digest)
}

/// Constant-time comparison of a candidate password against a stored hash.
#[must_use]
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let actual = hash_password(password, salt);
    if actual.len() != expected_hash.len() {
        return false;
    }
    actual
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

// =============================================================================
// REGISTER / LOGIN
// =============================================================================

/// Create an account. Returns the new user id.
pub async fn register(pool: &PgPool, form: &RegistrationForm) -> Result<Uuid, AccountError> {
    validation::validate_registration(form)?;
    let email = validation::normalize_email(&form.email).ok_or_else(|| ValidationError::field("email"))?;

    let salt = generate_salt();
    let hash = hash_password(&form.password, &salt);

    let result = sqlx::query(
        r"INSERT INTO users (first_name, last_name, email, phone_number, password_hash, password_salt)
          VALUES ($1, $2, $3, $4, $5, $6)
          RETURNING id",
    )
    .bind(form.first_name.trim())
    .bind(form.last_name.trim())
    .bind(&email)
    .bind(form.phone_number.trim())
    .bind(hash)
    .bind(salt)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row.get("id")),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AccountError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload the UI stores after login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "admin")]
    pub is_admin: bool,
    pub token: String,
}

/// Check credentials and open a session.
pub async fn login(
    pool: &PgPool,
    throttle: &LoginThrottle,
    request: &LoginRequest,
    session_ttl_days: i64,
) -> Result<LoginData, AccountError> {
    let email = validation::normalize_email(&request.email).ok_or_else(|| ValidationError::field("email"))?;
    throttle.check(&email)?;

    let row = sqlx::query(
        "SELECT id, first_name, last_name, email, is_admin, password_hash, password_salt FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        throttle.record_failure(&email);
        return Err(AccountError::InvalidCredentials);
    };

    let hash: String = row.get("password_hash");
    let salt: String = row.get("password_salt");
    if !verify_password(&request.password, &salt, &hash) {
        throttle.record_failure(&email);
        return Err(AccountError::InvalidCredentials);
    }
    throttle.clear(&email);

    let id: Uuid = row.get("id");
    let token = session::create_session(pool, id, session_ttl_days).await?;
    tracing::info!(user_id = %id, "user logged in");

    Ok(LoginData {
        id,
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        is_admin: row.get("is_admin"),
        token,
    })
}

// =============================================================================
// PROFILE
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_email_verified: bool,
    pub phone_number: Option<String>,
    pub is_phone_verified: bool,
    #[serde(with = "crate::services::iso_date::option")]
    pub date_of_birth: Option<Date>,
    #[serde(rename = "admin")]
    pub is_admin: bool,
    pub address: Address,
}

pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<UserDetails, AccountError> {
    let row = sqlx::query(
        r"SELECT id, first_name, last_name, email, email_verified, phone_number, phone_verified,
                 date_of_birth, is_admin, address_line, city, state, postal_code, country
          FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AccountError::NotFound)?;

    Ok(UserDetails {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        is_email_verified: row.get("email_verified"),
        phone_number: row.get("phone_number"),
        is_phone_verified: row.get("phone_verified"),
        date_of_birth: row.get("date_of_birth"),
        is_admin: row.get("is_admin"),
        address: Address {
            address_line: row.get("address_line"),
            city: row.get("city"),
            state: row.get("state"),
            postal_code: row.get("postal_code"),
            country: row.get("country"),
        },
    })
}

/// Partial update of personal details. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    /// ISO `yyyy-MM-dd`; an empty string clears it.
    pub date_of_birth: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone_number.is_none() && self.date_of_birth.is_none()
    }

    /// Validate fields present in the update.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank names or a malformed phone, and
    /// `InvalidDateOfBirth` for an unparsable or future date.
    pub fn validate(&self, today: Date) -> Result<Option<Option<Date>>, AccountError> {
        let mut bad = std::collections::BTreeSet::new();
        if self.first_name.as_deref().is_some_and(|v| v.trim().is_empty()) {
            bad.insert("first_name");
        }
        if self.last_name.as_deref().is_some_and(|v| v.trim().is_empty()) {
            bad.insert("last_name");
        }
        if self.phone_number.as_deref().is_some_and(|v| !validation::is_valid_phone(v)) {
            bad.insert("phone_number");
        }
        if !bad.is_empty() {
            return Err(ValidationError { fields: bad }.into());
        }

        match self.date_of_birth.as_deref().map(str::trim) {
            None => Ok(None),
            Some("") => Ok(Some(None)),
            Some(raw) => {
                let dob = Date::parse(raw, &time::macros::format_description!("[year]-[month]-[day]"))
                    .map_err(|_| AccountError::InvalidDateOfBirth)?;
                if dob >= today {
                    return Err(AccountError::InvalidDateOfBirth);
                }
                Ok(Some(Some(dob)))
            }
        }
    }
}

/// Apply a profile update and return the refreshed details.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
    today: Date,
) -> Result<UserDetails, AccountError> {
    let dob = update.validate(today)?;
    if update.is_empty() {
        return get_user(pool, user_id).await;
    }

    let result = sqlx::query(
        r"UPDATE users SET
              first_name     = COALESCE($2, first_name),
              last_name      = COALESCE($3, last_name),
              phone_verified = CASE WHEN $4::text IS NOT NULL AND $4 IS DISTINCT FROM phone_number
                                    THEN FALSE ELSE phone_verified END,
              phone_number   = COALESCE($4, phone_number),
              date_of_birth  = CASE WHEN $5 THEN $6 ELSE date_of_birth END
          WHERE id = $1",
    )
    .bind(user_id)
    .bind(update.first_name.as_deref().map(str::trim))
    .bind(update.last_name.as_deref().map(str::trim))
    .bind(update.phone_number.as_deref().map(str::trim))
    .bind(dob.is_some())
    .bind(dob.flatten())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AccountError::NotFound);
    }
    tracing::info!(%user_id, "profile updated");
    get_user(pool, user_id).await
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
