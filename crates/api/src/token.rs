//! JWT issuance and verification at the API boundary.
//!
//! The core never mints or parses tokens; it consumes the acting
//! principal extracted here.

use application::ActorContext;
use chrono::{Duration, Utc};
use domain::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use store::TokenInfo;

const TOKEN_LIFETIME_HOURS: i64 = 8;

/// JWT claims for an authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct JwtTokenProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtTokenProvider {
    /// Creates a provider from the configured secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a token for the authenticated principal.
    pub fn create(&self, info: &TokenInfo) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: info.user_id.to_string(),
            email: info.email.clone(),
            role: info.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verifies a token and returns its claims, or None if invalid.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }

    /// Builds the acting principal from an `Authorization: Bearer` header,
    /// falling back to anonymous.
    pub fn actor_from_header(&self, header: Option<&str>) -> ActorContext {
        let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
            return ActorContext::anonymous();
        };
        let Some(claims) = self.verify(token) else {
            return ActorContext::anonymous();
        };
        match Role::create(&claims.role) {
            Ok(role) => ActorContext::new(claims.email, role),
            Err(_) => ActorContext::anonymous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use common::AggregateId;

    use super::*;

    fn token_info() -> TokenInfo {
        TokenInfo {
            user_id: AggregateId::new(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            username: "johndoe".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn create_and_verify_roundtrip() {
        let provider = JwtTokenProvider::new("test-secret");
        let token = provider.create(&token_info()).unwrap();

        let claims = provider.verify(&token).unwrap();
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.role, "Admin");
    }

    #[test]
    fn verify_rejects_tokens_signed_with_another_secret() {
        let provider = JwtTokenProvider::new("test-secret");
        let other = JwtTokenProvider::new("other-secret");
        let token = provider.create(&token_info()).unwrap();

        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn actor_from_header_parses_bearer_token() {
        let provider = JwtTokenProvider::new("test-secret");
        let token = provider.create(&token_info()).unwrap();
        let header = format!("Bearer {token}");

        let actor = provider.actor_from_header(Some(&header));
        assert_eq!(actor.email, "john@example.com");
        assert_eq!(actor.role, Role::Admin);
    }

    #[test]
    fn actor_falls_back_to_anonymous() {
        let provider = JwtTokenProvider::new("test-secret");
        assert_eq!(provider.actor_from_header(None), ActorContext::anonymous());
        assert_eq!(
            provider.actor_from_header(Some("Bearer garbage")),
            ActorContext::anonymous()
        );
        assert_eq!(
            provider.actor_from_header(Some("Basic abc")),
            ActorContext::anonymous()
        );
    }
}
