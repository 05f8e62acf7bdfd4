//! Proof-of-service tokens.
//!
//! A token is a three-segment compact signed-claims string:
//!
//! ```text
//! base64url(header) . base64url(claims) . base64url(HMAC-SHA256(secret, header.claims))
//! ```
//!
//! Segments use URL-safe base64 without padding. Tokens are stateless: once
//! issued they verify (for anyone holding the secret) until their `exp` claim.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use path402_types::Amount;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::secret::SigningSecret;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm named in every token header.
pub const TOKEN_ALGORITHM: &str = "HS256";

/// Token type named in every token header.
pub const TOKEN_TYPE: &str = "JWT";

/// Fixed-shape token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// Claims carried by a proof-of-service token.
///
/// `issued_at` and `expires_at` are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClaims {
    /// Identity of the issuing server.
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Path that was served.
    pub path: String,
    /// Payment transaction identifier.
    #[serde(rename = "txid")]
    pub payment_proof_id: String,
    /// Amount paid, in minor units.
    #[serde(rename = "paid")]
    pub price_paid: Amount,
    #[serde(rename = "iat")]
    pub issued_at: u64,
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

/// Mints proof-of-service tokens with a fixed secret and lifetime.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: SigningSecret,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from a secret and token lifetime.
    pub fn new(secret: SigningSecret, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Get the configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token stamped with the current wall clock.
    pub fn issue(
        &self,
        path: &str,
        payment_proof_id: &str,
        price_paid: Amount,
        issuer: &str,
    ) -> CryptoResult<String> {
        self.issue_at(path, payment_proof_id, price_paid, issuer, unix_seconds())
    }

    /// Issue a token with an explicit issued-at time (Unix seconds).
    pub fn issue_at(
        &self,
        path: &str,
        payment_proof_id: &str,
        price_paid: Amount,
        issuer: &str,
        issued_at: u64,
    ) -> CryptoResult<String> {
        let claims = ServiceClaims {
            issuer: issuer.to_string(),
            path: path.to_string(),
            payment_proof_id: payment_proof_id.to_string(),
            price_paid,
            issued_at,
            expires_at: issued_at.saturating_add(self.ttl.as_secs()),
        };

        let header = encode_segment(&TokenHeader::default())?;
        let payload = encode_segment(&claims)?;
        let signing_input = format!("{}.{}", header, payload);
        let signature = URL_SAFE_NO_PAD.encode(sign(&self.secret, signing_input.as_bytes())?);

        Ok(format!("{}.{}", signing_input, signature))
    }
}

/// Verify a token against the current wall clock.
pub fn verify_token(token: &str, secret: &SigningSecret) -> CryptoResult<ServiceClaims> {
    verify_token_at(token, secret, unix_seconds())
}

/// Verify a token's signature and expiry at `now` (Unix seconds).
///
/// The signature is checked before any claim is trusted. A token is expired
/// once `now >= exp`.
pub fn verify_token_at(
    token: &str,
    secret: &SigningSecret,
    now: u64,
) -> CryptoResult<ServiceClaims> {
    let mut segments = token.split('.');
    let (header, payload, signature) = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => {
            return Err(CryptoError::MalformedToken(
                "expected three dot-separated segments".into(),
            ))
        }
    };

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| CryptoError::MalformedToken(format!("signature: {}", e)))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CryptoError::InvalidSecret(e.to_string()))?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)?;

    let header: TokenHeader = decode_segment(header)?;
    if header.alg != TOKEN_ALGORITHM {
        return Err(CryptoError::UnsupportedAlgorithm(header.alg));
    }

    let claims: ServiceClaims = decode_segment(payload)?;
    if now >= claims.expires_at {
        return Err(CryptoError::TokenExpired {
            expired_at: claims.expires_at,
        });
    }

    Ok(claims)
}

fn sign(secret: &SigningSecret, input: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CryptoError::InvalidSecret(e.to_string()))?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn encode_segment<T: Serialize>(value: &T) -> CryptoResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| CryptoError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> CryptoResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CryptoError::MalformedToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| CryptoError::MalformedToken(e.to_string()))
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret() -> SigningSecret {
        SigningSecret::from_bytes(b"test-secret".to_vec()).unwrap()
    }

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new(test_secret(), Duration::from_secs(3600))
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = test_issuer()
            .issue_at("/$doc", &"a".repeat(64), 1000, "node-1", 1_700_000_000)
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
    }

    #[test]
    fn test_verify_issued_token() {
        let token = test_issuer()
            .issue_at("/$doc", "txid-1", 1000, "node-1", 1_700_000_000)
            .unwrap();

        let claims = verify_token_at(&token, &test_secret(), 1_700_000_001).unwrap();
        assert_eq!(claims.issuer, "node-1");
        assert_eq!(claims.path, "/$doc");
        assert_eq!(claims.payment_proof_id, "txid-1");
        assert_eq!(claims.price_paid, 1000);
        assert_eq!(claims.issued_at, 1_700_000_000);
        assert_eq!(claims.expires_at, 1_700_003_600);
    }

    #[test]
    fn test_header_shape() {
        let token = test_issuer()
            .issue_at("/$doc", "tx", 1, "node-1", 0)
            .unwrap();
        let header = token.split('.').next().unwrap();
        let decoded = URL_SAFE_NO_PAD.decode(header).unwrap();
        assert_eq!(decoded, br#"{"alg":"HS256","typ":"JWT"}"#);
    }

    #[test]
    fn test_signature_matches_hmac_of_signing_input() {
        let token = test_issuer()
            .issue_at("/$doc", "tx", 1, "node-1", 0)
            .unwrap();
        let (input, sig) = token.rsplit_once('.').unwrap();

        let mut mac = HmacSha256::new_from_slice(b"test-secret").unwrap();
        mac.update(input.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        assert_eq!(sig, expected);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = test_issuer()
            .issue_at("/$doc", "tx", 1, "node-1", 1_700_000_000)
            .unwrap();
        let other = SigningSecret::from_bytes(b"other".to_vec()).unwrap();
        assert_eq!(
            verify_token_at(&token, &other, 1_700_000_001),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = test_issuer()
            .issue_at("/$doc", "tx", 1, "node-1", 1_700_000_000)
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = ServiceClaims {
            issuer: "node-1".into(),
            path: "/$doc".into(),
            payment_proof_id: "tx".into(),
            price_paid: 1_000_000,
            issued_at: 1_700_000_000,
            expires_at: 1_700_003_600,
        };
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            encode_segment(&forged_claims).unwrap(),
            parts[2]
        );

        assert_eq!(
            verify_token_at(&forged, &test_secret(), 1_700_000_001),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = test_issuer()
            .issue_at("/$doc", "tx", 1, "node-1", 1_700_000_000)
            .unwrap();
        assert_eq!(
            verify_token_at(&token, &test_secret(), 1_700_003_600),
            Err(CryptoError::TokenExpired {
                expired_at: 1_700_003_600
            })
        );
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(matches!(
            verify_token_at("only.two", &test_secret(), 0),
            Err(CryptoError::MalformedToken(_))
        ));
        assert!(matches!(
            verify_token_at("a.b.c.d", &test_secret(), 0),
            Err(CryptoError::MalformedToken(_))
        ));
        assert!(matches!(
            verify_token_at("a.b.!!!", &test_secret(), 0),
            Err(CryptoError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_issue_uses_wall_clock() {
        let issuer = test_issuer();
        let token = issuer.issue("/$doc", "tx", 5, "node-1").unwrap();
        let claims = verify_token(&token, &test_secret()).unwrap();
        assert_eq!(claims.expires_at - claims.issued_at, issuer.ttl().as_secs());
    }
}
