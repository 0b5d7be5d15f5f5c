use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::signatures::{MessageVerifier, SignatureError};
use crate::models::Id;

/// The signed bearer-token payload: subject (owner id) plus an absolute
/// expiry. Carrying an absolute timestamp rather than a duration means
/// verification needs no external clock state beyond "now".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerClaims {
    pub subject: Id,
    pub expires_at: DateTime<Utc>,
}

impl BearerClaims {
    pub fn new(subject: Id, ttl: Duration) -> Self {
        Self {
            subject,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

pub struct BearerTokens {
    verifier: MessageVerifier,
}

impl BearerTokens {
    pub fn new(secret: &str) -> Self {
        Self {
            verifier: MessageVerifier::with_key_base(secret.as_bytes()),
        }
    }

    pub fn mint(&self, subject: Id, ttl: Duration) -> Result<(String, DateTime<Utc>), SignatureError> {
        let claims = BearerClaims::new(subject, ttl);
        let token = self.verifier.sign(&claims)?;
        Ok((token, claims.expires_at))
    }

    /// Verifies signature, decodes claims, and rejects an expired token. Any
    /// failure is folded into a single `SignatureError` — the caller must not
    /// distinguish "expired" from "tampered" in the response.
    pub fn verify(&self, token: &str) -> Result<BearerClaims, SignatureError> {
        let claims: BearerClaims = self.verifier.verify(token)?;
        if claims.is_expired() {
            // Reuse `InvalidMac`'s opacity: to the caller this is just "invalid token".
            return Err(SignatureError::Malformed(serde::de::Error::custom(
                "token expired",
            )));
        }
        Ok(claims)
    }
}

/// Generates a 128-bit (or more) cryptographically random opaque token,
/// base64-url encoded, for session ids and password-reset tokens.
pub fn opaque_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_round_trips() {
        let tokens = BearerTokens::new("secret");
        let (token, _expires_at) = tokens.mint(42, Duration::hours(1)).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.subject, 42);
    }

    #[test]
    fn expired_token_fails() {
        let tokens = BearerTokens::new("secret");
        let (token, _) = tokens.mint(42, Duration::seconds(-1)).unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn bit_flip_fails() {
        let tokens = BearerTokens::new("secret");
        let (mut token, _) = tokens.mint(42, Duration::hours(1)).unwrap();
        token.replace_range(0..1, if token.starts_with('a') { "b" } else { "a" });
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn opaque_tokens_are_unique_and_long_enough() {
        let a = opaque_token();
        let b = opaque_token();
        assert_ne!(a, b);
        assert!(a.len() >= 22); // 128 bits base64url-no-pad is 22 chars minimum
    }
}
