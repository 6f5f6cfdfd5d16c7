pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;

pub use password::{hash_password, validate_password_strength, verify_password};

/// Token payload identifying the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?
            .timestamp();

        Ok(Self {
            id: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            iat: now.timestamp(),
            exp,
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("JWT expiry of {0} hours is out of range")]
    InvalidExpiry(u64),
    #[error("JWT generation error: {0}")]
    TokenGeneration(jsonwebtoken::errors::Error),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
}

pub fn generate_jwt(user: &User, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    let claims = Claims::for_user(user, security.jwt_expiry_hours)?;
    let key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(JwtError::TokenGeneration)
}

/// Check signature and expiry, returning the embedded claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default()).map_err(JwtError::InvalidToken)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_hours: 1,
            cors_origins: vec![],
            password_min_length: 6,
        }
    }

    fn user0() -> User {
        User {
            id: Uuid::new_v4(),
            username: "user0".to_string(),
            email: None,
            password: String::new(),
            roles: vec!["user".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let user = user0();
        let token = generate_jwt(&user, &security("test-secret")).unwrap();
        let claims = validate_jwt(&token, "test-secret").unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "user0");
        assert_eq!(claims.roles, vec!["user".to_string()]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_jwt(&user0(), &security("one")).unwrap();
        assert!(matches!(validate_jwt(&token, "two"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::for_user(&user0(), 1).unwrap();
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"s")).unwrap();
        assert!(validate_jwt(&token, "s").is_err());
    }

    #[test]
    fn oversized_expiry_is_an_error() {
        let mut config = security("s");
        config.jwt_expiry_hours = u64::MAX;
        assert!(matches!(generate_jwt(&user0(), &config), Err(JwtError::InvalidExpiry(_))));

        config.jwt_expiry_hours = 10_000_000_000;
        assert!(matches!(generate_jwt(&user0(), &config), Err(JwtError::InvalidExpiry(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(generate_jwt(&user0(), &security("")), Err(JwtError::MissingSecret)));
        assert!(matches!(validate_jwt("abc", ""), Err(JwtError::MissingSecret)));
    }
}
