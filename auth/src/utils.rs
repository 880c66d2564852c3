//! Utility functions for authentication.

/// Validate email address format.
///
/// This performs basic RFC 5322 validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Length must be between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use wayfarer_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '+' || c == '_';
    let valid_domain_chars = |c: char| c.is_alphanumeric() || c == '.' || c == '-';

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    // Domain labels must be non-empty
    domain.split('.').all(|part| !part.is_empty())
}

/// Normalise an email for storage and lookup: trimmed, lower-case.
///
/// # Examples
///
/// ```
/// use wayfarer_auth::utils::normalize_email;
///
/// assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
/// ```
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Mask the local part of an email for log output.
///
/// # Examples
///
/// ```
/// use wayfarer_auth::utils::redact_email;
///
/// assert_eq!(redact_email("jane@example.com"), "j***@example.com");
/// assert_eq!(redact_email("not-an-email"), "***");
/// ```
#[must_use]
pub fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map_or(String::new(), String::from);
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// Join first and last name into the stored display name.
///
/// # Examples
///
/// ```
/// use wayfarer_auth::utils::full_name;
///
/// assert_eq!(full_name("Jane", "Doe"), "Jane Doe");
/// assert_eq!(full_name(" Jane ", ""), "Jane");
/// ```
#[must_use]
pub fn full_name(first: &str, last: &str) -> String {
    let (first, last) = (first.trim(), last.trim());
    if last.is_empty() {
        first.to_string()
    } else if first.is_empty() {
        last.to_string()
    } else {
        format!("{first} {last}")
    }
}

/// `true` if `code` is exactly six ASCII digits.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    code.len() == crate::constants::otp::CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
