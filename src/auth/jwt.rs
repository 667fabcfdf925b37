use crate::error::{AppError, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// Verification parameters shared with the identity provider.
#[derive(Clone)]
pub struct JwtSettings {
    secret: DecodingKey,
    audience: Option<String>,
}

impl JwtSettings {
    pub fn new(secret: &str, audience: Option<String>) -> Self {
        Self {
            secret: DecodingKey::from_secret(secret.as_bytes()),
            audience,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

/// Verify a bearer token and extract its claims
pub fn verify_jwt(token: &str, settings: &JwtSettings) -> Result<Claims> {
    decode::<Claims>(token, &settings.secret, &settings.validation())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AppError::Unauthorized("Invalid token".to_string())
        })
}
