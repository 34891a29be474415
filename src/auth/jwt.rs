use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

pub fn create_access_token(
    user_id: Uuid,
    username: &str,
    config: &Config,
) -> AppResult<IssuedToken> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (now + Duration::seconds(config.jwt_ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create access token: {}", e)))?;

    Ok(IssuedToken {
        token,
        expires_in: config.jwt_ttl_secs,
    })
}

/// Any decode failure, expiry included, is reported as `Unauthorized`.
pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let config = Config::for_tests("secret");
        let user_id = Uuid::new_v4();
        let issued = create_access_token(user_id, "sam", &config).unwrap();
        assert_eq!(issued.expires_in, 7200);

        let data = verify_token(&issued.token, &config).unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.username, "sam");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = create_access_token(Uuid::new_v4(), "sam", &Config::for_tests("one")).unwrap();
        let err = verify_token(&issued.token, &Config::for_tests("two")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = Config::for_tests("secret");
        // Past the default 60s leeway.
        config.jwt_ttl_secs = -120;
        let issued = create_access_token(Uuid::new_v4(), "sam", &config).unwrap();
        assert!(matches!(
            verify_token(&issued.token, &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let config = Config::for_tests("secret");
        assert!(matches!(
            verify_token("not.a.jwt", &config),
            Err(AppError::Unauthorized)
        ));
    }
}
