//! Single-use secrets (invite acceptance, password reset).
//!
//! The raw token goes to the recipient out of band. Only a salted SHA-256
//! digest is persisted, in the form `hex(salt)$hex(sha256(salt || raw))`.

use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const TOKEN_BYTES: usize = 32;
const SALT_BYTES: usize = 16;

pub struct OneTimeToken {
    pub raw: String,
    pub hash: String,
}

impl std::fmt::Debug for OneTimeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneTimeToken")
            .field("raw", &"<redacted>")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Generate a fresh token from the OS CSPRNG together with its stored hash.
pub fn generate() -> Result<OneTimeToken, String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| format!("Entropy source failed: {e}"))?;
    let raw = hex::encode(bytes);

    let mut salt = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| format!("Entropy source failed: {e}"))?;

    let hash = hash_with_salt(&raw, &salt);
    Ok(OneTimeToken { raw, hash })
}

pub fn hash_with_salt(raw: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(raw.as_bytes());
    format!("{}${:x}", hex::encode(salt), hasher.finalize())
}

/// Check a presented raw token against a stored hash in constant time.
pub fn verify(raw: &str, stored: &str) -> bool {
    let Some((salt_hex, _)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    if salt.is_empty() {
        return false;
    }

    let expected = hash_with_salt(raw, &salt);
    expected.as_bytes().ct_eq(stored.as_bytes()).into()
}
