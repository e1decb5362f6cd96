//! Session token inspection.
//!
//! The backend signs bearer tokens with a 30-day expiry and verifies them
//! on every authenticated call. The client never holds the signing secret;
//! it only decodes the claims to notice a stale session early and drop it
//! instead of sending doomed requests.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims carried by a backend-issued session token.
///
/// Only `exp` matters to the client; identity fields are optional so that
/// claim-shape changes on the backend don't invalidate sessions here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier, when present.
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    /// Email address, when present.
    #[serde(default)]
    pub email: Option<String>,
    /// Issued-at (Unix timestamp, seconds).
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// Whether a stored token is still usable.
///
/// Decodes without signature validation (the secret lives on the backend)
/// and checks `exp` against now. Undecodable tokens count as expired.
#[must_use]
pub fn token_is_current(token: &str) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).is_ok()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_current() {
        let token = testing::signed_token(60 * 60);
        assert!(token_is_current(&token));
    }

    #[test]
    fn test_expired_token_is_not_current() {
        let token = testing::signed_token(-120);
        assert!(!token_is_current(&token));
    }

    #[test]
    fn test_garbage_token_is_not_current() {
        assert!(!token_is_current("not-a-token"));
        assert!(!token_is_current(""));
    }
}
