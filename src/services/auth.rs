//! Authentication service implementation
//!
//! Password hashing (Argon2id), session tokens (HS256 JWT) and the session
//! cookie that carries them.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use crate::config::AuthConfig;
use crate::models::User;
use crate::utils::errors::{EventHubError, Result};

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Authentication service for passwords, tokens and cookies
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    keys: Arc<Keys>,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        let keys = Keys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        };
        Self { config, keys: Arc::new(keys) }
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| EventHubError::PasswordHash(e.to_string()))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| EventHubError::PasswordHash(e.to_string()))
    }

    /// Check a password against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| EventHubError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }

    /// Issue a session token for `user`
    pub fn issue_token(&self, user: &User) -> Result<String> {
        let claims = Claims::new(user, Duration::hours(self.config.token_ttl_hours));
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)?;
        debug!(user_id = user.id, "Session token issued");
        Ok(token)
    }

    /// Validate a session token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)?;
        Ok(data.claims)
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// HTTP-only cookie carrying `token`
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), token))
            .http_only(true)
            .secure(self.config.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(cookie::time::Duration::hours(self.config.token_ttl_hours))
            .build()
    }

    /// Cookie that removes the session cookie
    pub fn clear_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.config.cookie_name.clone(), ""))
            .http_only(true)
            .secure(self.config.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .build();
        cookie.make_removal();
        cookie
    }
}
