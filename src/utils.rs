//! Utility functions and types.

use std::fmt::Debug;

use uuid::Uuid;

/// Generate a fresh per-request nonce.
///
/// Nonces are random UUIDv4 strings; they are never derived from request
/// content, so repeated signings of the same request still produce distinct
/// headers.
pub fn new_nonce() -> String {
    Uuid::new_v4().to_string()
}

/// Redacts a string by replacing all but the first and last three characters
/// with asterisks.
///
/// Short inputs are redacted entirely so that the output never narrows the
/// search space for a leaked secret.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.len();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            f.write_str(&self.0[..3])?;
            f.write_str("***")?;
            f.write_str(&self.0[length - 3..])
        }
    }
}
