//! HMAC signing and timing-safe verification of webhook blobs.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Algorithm tag prepended to SHA-1 signatures (`X-Hub-Signature`).
pub const SHA1_PREFIX: &str = "sha1=";

/// Sign a blob the way GitHub signs `X-Hub-Signature`.
///
/// Returns `sha1=` followed by the lowercase hex HMAC-SHA1 of `blob`.
pub fn sign(secret: &[u8], blob: &[u8]) -> String {
    let mut mac = match HmacSha1::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    mac.update(blob);
    format!("{}{}", SHA1_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Lowercase hex HMAC-SHA256 of `blob`, no prefix (Gitea / Gogs).
pub fn sign_sha256_hex(secret: &[u8], blob: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    mac.update(blob);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a claimed `sha1=` signature against the blob.
pub fn verify(secret: &[u8], claimed: &str, blob: &[u8]) -> bool {
    let expected = sign(secret, blob);
    matches_expected(secret, claimed, &expected)
}

/// Check a claimed bare-hex HMAC-SHA256 signature against the blob.
pub fn verify_sha256_hex(secret: &[u8], claimed: &str, blob: &[u8]) -> bool {
    let expected = sign_sha256_hex(secret, blob);
    matches_expected(secret, claimed, &expected)
}

/// Check a shared-secret token (GitLab's `X-Gitlab-Token`).
pub fn verify_token(secret: &[u8], claimed: &str) -> bool {
    matches_expected(secret, claimed, &String::from_utf8_lossy(secret))
}

/// Length check first (may leak length), then a constant-time byte comparison.
fn matches_expected(key: &[u8], claimed: &str, expected: &str) -> bool {
    if claimed.len() != expected.len() {
        return false;
    }
    constant_time_eq(key, claimed.as_bytes(), expected.as_bytes())
}

/// Compare two byte strings without an early exit.
///
/// Both sides are folded through HMAC-SHA256 and the tags are checked with
/// `Mac::verify_slice`, which compares in constant time.
fn constant_time_eq(key: &[u8], a: &[u8], b: &[u8]) -> bool {
    let mut tag = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    tag.update(b);
    let expected = tag.finalize().into_bytes();

    let mut candidate = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    candidate.update(a);
    candidate.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_sign_known_vector() {
        assert_eq!(
            sign(b"key", FOX),
            "sha1=de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9"
        );
    }

    #[test]
    fn test_sign_sha256_known_vector() {
        assert_eq!(
            sign_sha256_hex(b"key", FOX),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let blob = br#"{"some":"github","object":"with","properties":true}"#;
        assert_eq!(sign(b"bogus", blob), sign(b"bogus", blob));
    }

    #[test]
    fn test_verify_round_trip() {
        let blobs: [&[u8]; 4] = [b"", b"{}", FOX, &[0u8, 255, 10, 13]];
        for blob in blobs {
            let signature = sign(b"bogus", blob);
            assert!(verify(b"bogus", &signature, blob));
        }
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let signature = sign(b"secret-one", FOX);
        assert!(!verify(b"secret-two", &signature, FOX));
    }

    #[test]
    fn test_verify_rejects_modified_blob() {
        let signature = sign(b"bogus", b"{\"amount\":100}");
        assert!(!verify(b"bogus", &signature, b"{\"amount\":999}"));
    }

    #[test]
    fn test_verify_rejects_flipped_first_char() {
        let signature = sign(b"bogus", FOX);
        let broken = format!("0{}", &signature[1..]);
        assert_eq!(broken.len(), signature.len());
        assert!(!verify(b"bogus", &broken, FOX));
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let signature = sign(b"bogus", FOX);
        assert!(!verify(b"bogus", &signature[..signature.len() - 1], FOX));
        assert!(!verify(b"bogus", &format!("{}0", signature), FOX));
        assert!(!verify(b"bogus", "", FOX));
    }

    #[test]
    fn test_verify_sha256_hex() {
        let signature = sign_sha256_hex(b"gitea", FOX);
        assert_eq!(signature.len(), 64);
        assert!(verify_sha256_hex(b"gitea", &signature, FOX));
        assert!(!verify_sha256_hex(b"gitea", &signature.to_uppercase(), FOX));
        assert!(!verify_sha256_hex(b"gitea", &format!("sha256={}", signature), FOX));
    }

    #[test]
    fn test_verify_token() {
        assert!(verify_token(b"s3cret", "s3cret"));
        assert!(!verify_token(b"s3cret", "s3creT"));
        assert!(!verify_token(b"s3cret", "s3cre"));
    }
}
