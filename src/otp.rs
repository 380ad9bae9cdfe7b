//! One-time codes for password reset: 6 digits, 15-minute validity, 60-second
//! resend window. Issuance time is derived from the stored expiry, so the
//! user row only needs the code and its expiry.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const TTL_MINUTES: i64 = 15;
pub const RESEND_COOLDOWN_SECS: i64 = 60;

/// Generate a 6-digit numeric code.
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(TTL_MINUTES)
}

/// Seconds the caller still has to wait before a resend is allowed, or `None`
/// when a new code may be issued. A missing expiry means no code is pending.
pub fn resend_wait_secs(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    let expires = expires?;
    let issued_at = expires - Duration::minutes(TTL_MINUTES);
    let elapsed = (now - issued_at).num_seconds();
    if elapsed < RESEND_COOLDOWN_SECS {
        Some(RESEND_COOLDOWN_SECS - elapsed)
    } else {
        None
    }
}

/// A reset is honored only while the submitted code matches the stored one
/// and `now` is strictly before the expiry; exactly at expiry fails.
pub fn code_matches(
    stored: Option<&str>,
    expires: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> bool {
    let (Some(stored), Some(expires)) = (stored, expires) else {
        return false;
    };
    !stored.is_empty() && stored == submitted.trim() && now < expires
}
