use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::model::user::UserId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session token is malformed")]
    Malformed,
    #[error("session token signature does not match")]
    BadSignature,
    #[error("session token has expired")]
    Expired,
    #[error("session secret must not be empty")]
    EmptySecret,
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and checks HS256 JWTs carrying `{sub, exp}`.
#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::EmptySecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, user: &UserId) -> Result<String, SessionError> {
        self.issue_with_expiry(user, Utc::now().timestamp() + self.ttl.num_seconds())
    }

    fn issue_with_expiry(&self, user: &UserId, exp: i64) -> Result<String, SessionError> {
        let claims = Claims {
            sub: user.to_string(),
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => SessionError::Expired,
            ErrorKind::InvalidSignature => SessionError::BadSignature,
            _ => SessionError::Malformed,
        })?;
        UserId::parse(&data.claims.sub).ok_or(SessionError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn signer() -> SessionSigner {
        SessionSigner::new(b"test-secret", Duration::days(7)).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let user = UserId::new();
        let token = signer().issue(&user).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(signer().verify(&token), Ok(user));
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = signer().issue(&UserId::new()).unwrap();
        let other = SessionSigner::new(b"another-secret", Duration::days(7)).unwrap();
        assert_eq!(other.verify(&token), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let signer = signer();
        let token = signer.issue(&UserId::new()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = format!(r#"{{"sub":"{}","exp":9999999999}}"#, UserId::new());
        let forged = format!("{}.{}.{}", parts[0], URL_SAFE_NO_PAD.encode(forged_claims), parts[2]);
        assert_eq!(signer.verify(&forged), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_rejects_expired() {
        let signer = signer();
        let token = signer
            .issue_with_expiry(&UserId::new(), Utc::now().timestamp() - 1)
            .unwrap();
        assert_eq!(signer.verify(&token), Err(SessionError::Expired));
    }

    #[test]
    fn test_rejects_non_uuid_subject() {
        let signer = signer();
        let claims = Claims {
            sub: "admin".to_string(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &signer.encoding).unwrap();
        assert_eq!(signer.verify(&token), Err(SessionError::Malformed));
    }

    #[test]
    fn test_empty_secret_refused() {
        assert!(matches!(
            SessionSigner::new(b"", Duration::days(1)),
            Err(SessionError::EmptySecret)
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(signer().verify(""), Err(SessionError::Malformed));
        assert_eq!(signer().verify("abc"), Err(SessionError::Malformed));
        assert_eq!(signer().verify("abc.def.ghi"), Err(SessionError::Malformed));
    }
}
