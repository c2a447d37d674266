use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use super::validator::{Scope, TokenValidator};
use crate::config::JwtConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account email
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, subject: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(sub = %subject, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Grants [`Scope::Root`] to a valid JWT whose subject is the root email.
pub struct JwtRootValidator {
    keys: JwtKeys,
    root_email: String,
}

impl JwtRootValidator {
    pub fn new(keys: JwtKeys, root_email: impl Into<String>) -> Self {
        Self {
            keys,
            root_email: root_email.into(),
        }
    }

    /// Mints a token for the root identity.
    pub fn issue_root_token(&self) -> anyhow::Result<String> {
        self.keys.sign(&self.root_email)
    }
}

impl TokenValidator for JwtRootValidator {
    fn validate(&self, credential: &str) -> Option<Scope> {
        let claims = match self.keys.verify(credential) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                return None;
            }
        };
        if claims.sub.eq_ignore_ascii_case(&self.root_email) {
            Some(Scope::Root)
        } else {
            warn!(sub = %claims.sub, "token subject is not the root identity");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.sign("root@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, "root@example.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys("same-secret", "good-iss", "good-aud");
        let bad_keys = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good_keys.sign("root@example.com").expect("sign");
        assert!(bad_keys.verify(&token).is_err());
    }

    #[test]
    fn root_validator_grants_root_token() {
        let validator = JwtRootValidator::new(make_keys("s", "i", "a"), "root@example.com");
        let token = validator.issue_root_token().expect("issue");
        assert_eq!(validator.validate(&token), Some(Scope::Root));
    }

    #[test]
    fn root_validator_rejects_other_subjects() {
        let keys = make_keys("s", "i", "a");
        let token = keys.sign("someone@example.com").expect("sign");
        let validator = JwtRootValidator::new(keys, "root@example.com");
        assert_eq!(validator.validate(&token), None);
    }

    #[test]
    fn root_validator_rejects_foreign_signature() {
        let validator = JwtRootValidator::new(make_keys("ours", "i", "a"), "root@example.com");
        let forged = make_keys("theirs", "i", "a")
            .sign("root@example.com")
            .expect("sign");
        assert_eq!(validator.validate(&forged), None);
        assert_eq!(validator.validate("not-a-jwt"), None);
    }
}
