//! One-time code generation, hashing and key layout.

use crate::constants::{keys, otp};
use crate::state::OtpPurpose;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a uniformly random six-digit code.
///
/// Uses the thread-local CSPRNG.
#[must_use]
pub fn generate_code() -> String {
    let n = rand::thread_rng().gen_range(otp::CODE_MIN..=otp::CODE_MAX);
    format!("{n:06}")
}

/// Lower-case hex SHA-256 of the code's string form.
///
/// Only the hash is ever stored.
///
/// # Examples
///
/// ```
/// use wayfarer_auth::otp::code::hash_code;
///
/// assert_eq!(
///     hash_code("123456"),
///     "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
/// );
/// ```
#[must_use]
pub fn hash_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.as_bytes()))
}

/// Cache key for the live code of `(purpose, email)`.
///
/// # Examples
///
/// ```
/// use wayfarer_auth::otp::code::code_key;
/// use wayfarer_auth::state::OtpPurpose;
///
/// assert_eq!(code_key(OtpPurpose::Guest, "jane@example.com"), "otp:guest:jane@example.com");
/// ```
#[must_use]
pub fn code_key(purpose: OtpPurpose, email: &str) -> String {
    format!("{}:{}:{email}", keys::OTP_PREFIX, purpose.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_valid_code;

    #[test]
    fn test_generated_codes_are_six_digits_in_range() {
        for _ in 0..1_000 {
            let code = generate_code();
            assert!(is_valid_code(&code), "bad code {code}");
            let n: u32 = code.parse().unwrap_or(0);
            assert!((otp::CODE_MIN..=otp::CODE_MAX).contains(&n));
        }
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = hash_code("000000");
        assert_eq!(hash.len(), 64);
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(hash_code("000000"), hash_code("0"));
    }

    #[test]
    fn test_keys_are_separated_by_purpose() {
        assert_ne!(
            code_key(OtpPurpose::Register, "a@b.co"),
            code_key(OtpPurpose::Login, "a@b.co")
        );
    }
}
