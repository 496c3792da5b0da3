//! Secret detection and redaction utilities.
//!
//! Diagnostic lines frequently carry request bodies and headers; these helpers
//! keep credentials out of the log stream and out of error metadata.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key or header name likely refers to a secret.
///
/// Keys are split into words on `_`, `-`, `.` and camelCase boundaries; a key is
/// secret when any word is a credential term.
///
/// # Examples
///
/// ```
/// use reqlens_shared::is_secret_key;
///
/// assert!(is_secret_key("Authorization"));
/// assert!(is_secret_key("apiKey"));
/// assert!(is_secret_key("x-session-cookie"));
/// assert!(!is_secret_key("dataKeys"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    key_words(key).iter().any(|word| SECRET_WORDS.contains(&word.as_str()))
}

const SECRET_WORDS: &[&str] = &[
    "KEY",
    "APIKEY",
    "TOKEN",
    "SECRET",
    "PASSWORD",
    "PASSWD",
    "CREDENTIAL",
    "CREDENTIALS",
    "AUTH",
    "AUTHORIZATION",
    "COOKIE",
];

fn key_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in key.chars() {
        if matches!(ch, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        current.push(ch.to_ascii_uppercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Redacts a value if the key is likely a secret.
///
/// ```
/// use reqlens_shared::{REDACTED, redact_if_secret};
///
/// assert_eq!(redact_if_secret("password", "hunter2"), REDACTED);
/// assert_eq!(redact_if_secret("url", "/courses"), "/courses");
/// ```
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}
