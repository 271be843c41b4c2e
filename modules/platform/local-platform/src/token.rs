//! HS256 ID tokens.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use platform_sdk::{IdTokenClaims, PlatformError};
use time::OffsetDateTime;

use crate::config::LocalPlatformConfig;
use crate::state::StoredUser;

pub(crate) struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub(crate) fn new(config: &LocalPlatformConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.token_secret.as_bytes()),
            issuer: config.issuer(),
            audience: config.project_id.clone(),
            ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Token for `user` carrying its current custom claims.
    pub(crate) fn issue(&self, user: &StoredUser) -> Result<String, PlatformError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = IdTokenClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: user.uid.clone(),
            email: Some(user.email.clone()),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
            role: user.custom_claims.role,
            company_id: user.custom_claims.company_id.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| PlatformError::Internal(format!("failed to sign id token: {e}")))
    }

    pub(crate) fn verify(&self, token: &str) -> Result<IdTokenClaims, PlatformError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        decode::<IdTokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| PlatformError::InvalidIdToken {
                reason: e.to_string(),
            })
    }
}
