use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use proptest::prelude::*;
use uuid::Uuid;

use gatekeeper::auth::jwt::{Claims, SessionKeys};
use gatekeeper::auth::{password, token};

const SECRET: &str = "test-jwt-secret-that-is-long-enough";

// ── Passwords ───────────────────────────────────────────────────

#[test]
fn password_hash_verifies_and_is_salted() {
    let first = password::hash("correct horse").unwrap();
    let second = password::hash("correct horse").unwrap();

    assert!(first.starts_with("$argon2id$"));
    assert_ne!(first, second);
    assert!(password::verify("correct horse", &first));
    assert!(password::verify("correct horse", &second));
    assert!(!password::verify("wrong horse", &first));
}

#[test]
fn malformed_password_hash_never_matches() {
    assert!(!password::verify("anything", ""));
    assert!(!password::verify("anything", "not-a-phc-string"));
}

#[test]
fn password_strength_requires_eight_characters() {
    assert!(password::validate_strength("1234567").is_err());
    assert!(password::validate_strength("12345678").is_ok());
}

// ── One-time tokens ─────────────────────────────────────────────

#[test]
fn generated_token_shape() {
    let issued = token::generate().unwrap();

    assert_eq!(issued.raw.len(), 64);
    assert!(issued.raw.chars().all(|c| c.is_ascii_hexdigit()));

    let (salt, digest) = issued.hash.split_once('$').unwrap();
    assert_eq!(salt.len(), 32);
    assert_eq!(digest.len(), 64);
}

#[test]
fn generated_tokens_are_unique() {
    let a = token::generate().unwrap();
    let b = token::generate().unwrap();
    assert_ne!(a.raw, b.raw);
    assert_ne!(a.hash, b.hash);
}

#[test]
fn token_verify_rejects_wrong_and_malformed() {
    let issued = token::generate().unwrap();
    assert!(token::verify(&issued.raw, &issued.hash));
    assert!(!token::verify(&"0".repeat(64), &issued.hash));
    assert!(!token::verify(&issued.raw, "no-separator"));
    assert!(!token::verify(&issued.raw, "zz$abcd"));
    assert!(!token::verify(&issued.raw, "$abcd"));
}

#[test]
fn token_debug_hides_raw_value() {
    let issued = token::generate().unwrap();
    let shown = format!("{issued:?}");
    assert!(!shown.contains(&issued.raw));
}

proptest! {
    #[test]
    fn stored_hash_never_reveals_raw(raw in "[0-9a-f]{64}", salt in proptest::collection::vec(any::<u8>(), 16)) {
        let stored = token::hash_with_salt(&raw, &salt);

        prop_assert!(token::verify(&raw, &stored));
        prop_assert_ne!(&stored, &raw);
        prop_assert!(!stored.contains(&raw));
    }

    #[test]
    fn any_other_raw_fails(raw in "[0-9a-f]{64}", other in "[0-9a-f]{64}") {
        prop_assume!(raw != other);
        let stored = token::hash_with_salt(&raw, &[7u8; 16]);
        prop_assert!(!token::verify(&other, &stored));
    }
}

// ── Session JWTs ────────────────────────────────────────────────

#[test]
fn session_token_round_trip() {
    let keys = SessionKeys::from_secret(SECRET);
    let user = Uuid::new_v4();
    let tenant = Uuid::new_v4();

    let jwt = keys.issue(user, Some(tenant), "admin").unwrap();
    let claims = keys.verify(&jwt).unwrap();

    assert_eq!(claims.sub, user);
    assert_eq!(claims.tenant, Some(tenant));
    assert_eq!(claims.role, "admin");
    assert!(claims.exp > Utc::now().timestamp());
}

#[test]
fn superadmin_session_has_no_tenant() {
    let keys = SessionKeys::from_secret(SECRET);
    let jwt = keys.issue(Uuid::new_v4(), None, "superadmin").unwrap();
    assert_eq!(keys.verify(&jwt).unwrap().tenant, None);
}

#[test]
fn session_token_rejects_other_secret() {
    let jwt = SessionKeys::from_secret(SECRET)
        .issue(Uuid::new_v4(), None, "admin")
        .unwrap();
    let other = SessionKeys::from_secret("another-secret-that-is-long-enough!!");
    assert!(other.verify(&jwt).is_err());
}

#[test]
fn session_token_rejects_expired() {
    let keys = SessionKeys::from_secret(SECRET);
    let claims = Claims {
        sub: Uuid::new_v4(),
        tenant: None,
        role: "admin".to_string(),
        exp: Utc::now().timestamp() - 3600,
    };
    let jwt = keys.encode(&claims).unwrap();
    assert!(keys.verify(&jwt).is_err());
}

#[test]
fn session_token_rejects_recently_expired() {
    let keys = SessionKeys::from_secret(SECRET);
    let claims = Claims {
        sub: Uuid::new_v4(),
        tenant: None,
        role: "admin".to_string(),
        exp: Utc::now().timestamp() - 30,
    };
    let jwt = keys.encode(&claims).unwrap();
    assert!(keys.verify(&jwt).is_err(), "token expired 30s ago must not verify");
}

#[test]
fn session_token_rejects_other_algorithms() {
    let keys = SessionKeys::from_secret(SECRET);
    let claims = Claims::new(Uuid::new_v4(), None, "admin".to_string());
    let jwt = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    assert!(keys.verify(&jwt).is_err());
}

#[test]
fn session_keys_debug_is_redacted() {
    let keys = SessionKeys::from_secret(SECRET);
    assert!(!format!("{keys:?}").contains(SECRET));
}
