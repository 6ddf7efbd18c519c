use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, TokenData, Validation};

use crate::entities::token::Claims;
use crate::errors::AuthError;
use crate::settings::{AppConfig, JwtKeys};

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

/// Verifies the bearer tokens issued by the identity provider.
///
/// `create_token` signs with the same shared secret. The service itself never
/// hands tokens out; it exists for local tooling and tests.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            expiration: Duration::minutes(config.jwt_expiration_minutes),
        }
    }

    pub fn create_token(&self, user_id: &str, name: Option<&str>) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.expiration).timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.map(str::to_string),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|_| AuthError::TokenCreation)
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.keys.decoding, &validation).map_err(AuthError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::testing_config;

    #[test]
    fn issued_tokens_decode_to_the_same_identity() {
        let service = JwtService::new(&testing_config());
        let token = service.create_token("user-1", Some("Ada")).unwrap();

        let claims = service.decode_jwt(&token).unwrap().claims;
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let mut other = testing_config();
        other.jwt_secret = "another_secret_that_is_also_long_enough_for_hs512".into();
        let token = JwtService::new(&other).create_token("user-1", None).unwrap();

        let result = JwtService::new(&testing_config()).decode_jwt(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
