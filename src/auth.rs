//! HS256 access tokens.

use crate::authz::Caller;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn caller(&self) -> Caller {
        Caller::User {
            id: self.sub,
            is_admin: self.is_admin,
        }
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        TokenService {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid, is_admin: bool) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, is_admin, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        is_admin: bool,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id,
            is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks signature, algorithm and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    #[test]
    fn issued_token_validates_to_same_claims() {
        let tokens = TokenService::new("secret", Duration::minutes(15));
        let id = Uuid::new_v4();
        let token = tokens.issue(id, true).unwrap();
        let claims = tokens.validate(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(claims.caller(), Caller::User { id, is_admin: true });
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("secret", Duration::minutes(15));
        let token = tokens
            .issue_at(Uuid::new_v4(), false, Utc::now() - Duration::hours(1))
            .unwrap();
        let err = tokens.validate(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let ours = TokenService::new("secret", Duration::minutes(15));
        let theirs = TokenService::new("other", Duration::minutes(15));
        let token = theirs.issue(Uuid::new_v4(), true).unwrap();
        let err = ours.validate(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenService::new("secret", Duration::minutes(15));
        assert!(tokens.validate("not.a.token").is_err());
    }
}
