//! Access token expiry checks.
//!
//! Tokens are JWTs; only the `exp` claim of the payload is read. The
//! signature is the server's business and is never verified here.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// JWT claims for extracting expiration time.
///
/// `exp` is a NumericDate, which may carry a fractional part.
#[derive(Deserialize)]
struct JwtClaims {
    exp: f64,
}

/// Decode the expiry instant embedded in an access token.
///
/// Returns `None` if the token is not a three-part JWT, the payload is not
/// base64url JSON, or the `exp` claim is missing or out of range.
pub fn decode_expiry(access_token: &str) -> Option<DateTime<Utc>> {
    let mut parts = access_token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    // Some issuers pad their segments anyway.
    let payload = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&payload).ok()?;
    if !claims.exp.is_finite() {
        return None;
    }
    // the cast saturates; from_timestamp rejects anything out of range
    DateTime::from_timestamp(claims.exp.floor() as i64, 0)
}

/// Check whether an access token can be presented right now.
///
/// False for a missing token, a malformed token, or one whose expiry is at
/// or before the current instant. Never fails.
pub fn is_usable(access_token: Option<&str>) -> bool {
    is_usable_at(access_token, Utc::now())
}

/// [`is_usable`] against an explicit clock.
pub fn is_usable_at(access_token: Option<&str>, now: DateTime<Utc>) -> bool {
    access_token
        .and_then(decode_expiry)
        .map(|expires_at| expires_at > now)
        .unwrap_or(false)
}

/// Seconds until the token expires; negative once it has.
pub fn seconds_until_expiry(access_token: &str) -> Option<i64> {
    decode_expiry(access_token).map(|expires_at| (expires_at - Utc::now()).num_seconds())
}
