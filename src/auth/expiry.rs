//! Expiry decisions for stored tokens. No network access.
//!
//! All timestamps are epoch milliseconds. The `_at` variants take an
//! explicit "now" so the boundary behavior is testable without clock
//! control; the plain variants read the system clock.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Current time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// True iff the token is expired at `now`. Exact equality counts as expired.
#[must_use]
pub fn is_expired_at(expires_at: i64, now: i64) -> bool {
    now >= expires_at
}

/// True iff the token is expired right now.
#[must_use]
pub fn is_expired(expires_at: i64) -> bool {
    is_expired_at(expires_at, now_millis())
}

/// True iff the token expires within `threshold` of `now`.
#[must_use]
pub fn is_near_expiry_at(expires_at: i64, threshold: Duration, now: i64) -> bool {
    now + threshold.as_millis() as i64 >= expires_at
}

/// True iff the token expires within `threshold` of right now.
#[must_use]
pub fn is_near_expiry(expires_at: i64, threshold: Duration) -> bool {
    is_near_expiry_at(expires_at, threshold, now_millis())
}

/// Read the expiry from a JWT's `exp` claim, as epoch milliseconds.
///
/// Decodes the middle segment as unpadded base64url and reads `exp`
/// (seconds). Returns `None` on any malformation - callers treat an
/// undecodable token as "cannot determine, assume expired".
#[must_use]
pub fn decode_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    exp.checked_mul(1000)
}
