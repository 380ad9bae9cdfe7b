use chrono::{Duration, Utc};
use yaqeen_api::otp::{
    RESEND_COOLDOWN_SECS, TTL_MINUTES, code_matches, expiry_from, generate_code, resend_wait_secs,
};

#[test]
fn generated_code_is_six_digits() {
    for _ in 0..50 {
        let code = generate_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn expiry_is_fifteen_minutes_out() {
    let now = Utc::now();
    assert_eq!(expiry_from(now) - now, Duration::minutes(TTL_MINUTES));
}

#[test]
fn matching_code_before_expiry_succeeds() {
    let now = Utc::now();
    let expires = expiry_from(now);
    assert!(code_matches(Some("123456"), Some(expires), "123456", now));
    // Submitted codes are trimmed like the rest of the auth input.
    assert!(code_matches(Some("123456"), Some(expires), " 123456 ", now));
}

#[test]
fn wrong_code_fails() {
    let now = Utc::now();
    let expires = expiry_from(now);
    assert!(!code_matches(Some("123456"), Some(expires), "654321", now));
}

#[test]
fn exactly_at_expiry_fails() {
    let now = Utc::now();
    assert!(!code_matches(Some("123456"), Some(now), "123456", now));
}

#[test]
fn after_expiry_fails() {
    let now = Utc::now();
    let expires = now - Duration::seconds(1);
    assert!(!code_matches(Some("123456"), Some(expires), "123456", now));
}

#[test]
fn missing_code_or_expiry_fails() {
    let now = Utc::now();
    assert!(!code_matches(None, Some(expiry_from(now)), "123456", now));
    assert!(!code_matches(Some("123456"), None, "123456", now));
}

#[test]
fn resend_within_cooldown_returns_wait() {
    let issued = Utc::now();
    let expires = expiry_from(issued);

    let wait = resend_wait_secs(Some(expires), issued + Duration::seconds(10));
    assert_eq!(wait, Some(RESEND_COOLDOWN_SECS - 10));
}

#[test]
fn resend_after_cooldown_is_allowed() {
    let issued = Utc::now();
    let expires = expiry_from(issued);

    let wait = resend_wait_secs(Some(expires), issued + Duration::seconds(RESEND_COOLDOWN_SECS));
    assert_eq!(wait, None);
}

#[test]
fn resend_without_pending_code_is_allowed() {
    assert_eq!(resend_wait_secs(None, Utc::now()), None);
}
