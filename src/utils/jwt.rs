use crate::error::{AppError, AppResult};
use crate::models::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by access tokens minted by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider user id.
    pub sub: String,
    /// Display name shown in listings and matched against participants.
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String,
}

#[derive(Clone)]
pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Mints an access token. Used by tests and local tooling; in production
    /// tokens come from the identity provider sharing the same secret.
    pub fn generate_access_token(
        &self,
        user_id: i64,
        display_name: &str,
        role: Role,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            name: display_name.to_string(),
            role,
            exp: (now + Duration::hours(24)).timestamp(),
            iat: now.timestamp(),
            token_type: "access".to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(AppError::from)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::AuthError("Invalid or expired token".to_string()))?;

        if data.claims.token_type != "access" {
            return Err(AppError::AuthError("Not an access token".to_string()));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_roundtrip() {
        let jwt = JwtService::new("test-secret".to_string());
        let token = jwt
            .generate_access_token(42, "Alice", Role::Admin)
            .unwrap();
        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let jwt = JwtService::new("test-secret".to_string());
        let token = jwt
            .generate_access_token(1, "Bob", Role::Customer)
            .unwrap();
        let other = JwtService::new("other-secret".to_string());
        assert!(other.verify_access_token(&token).is_err());
    }
}
