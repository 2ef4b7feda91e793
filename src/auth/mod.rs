pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};
use crate::database::models::user::USERNAME_MAX_LEN;
use crate::database::models::User;
use crate::database::{StoreError, UserRepository};

pub use password::{dummy_hash, hash_password, verify_password};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// User id
    pub uid: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        let exp = (now + ttl).timestamp();

        Self {
            sub: user.username.clone(),
            uid: user.id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingToken,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User inactive or deleted.")]
    InactiveUser,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Invalid user details: {0}")]
    InvalidUser(String),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Signing and verification keys for bearer tokens
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    /// Lifetimes are clamped to 1..=MAX_JWT_EXPIRY_HOURS hours
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        let hours = i64::try_from(expiry_hours.clamp(1, MAX_JWT_EXPIRY_HOURS)).unwrap_or(1);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(hours),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn expires_in_secs(&self) -> u64 {
        u64::try_from(self.ttl.num_seconds()).unwrap_or(0)
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.sign(&Claims::new(user, self.ttl))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding).map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(token_data.claims)
    }
}

/// Check a username/password pair against the user store
pub async fn authenticate(users: &dyn UserRepository, username: &str, password: &str) -> Result<User, AuthError> {
    let Some(user) = users.find_by_username(username).await? else {
        // Same bcrypt work as a wrong password
        verify_password(password, dummy_hash());
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    if !user.is_active {
        return Err(AuthError::InactiveUser);
    }
    Ok(user)
}

/// Create an API user with a freshly hashed password
pub async fn register_user(users: &dyn UserRepository, username: &str, password: &str) -> Result<User, AuthError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LEN {
        return Err(AuthError::InvalidUser(format!(
            "username must be 1 to {} characters",
            USERNAME_MAX_LEN
        )));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidUser("password must not be empty".to_string()));
    }
    let password_hash = hash_password(password)?;
    Ok(users.create(username, &password_hash).await?)
}

/// Create the user unless one with this username already exists. Returns whether it was created.
pub async fn ensure_user(users: &dyn UserRepository, username: &str, password: &str) -> Result<bool, AuthError> {
    if users.find_by_username(username.trim()).await?.is_some() {
        return Ok(false);
    }
    register_user(users, username, password).await?;
    Ok(true)
}
