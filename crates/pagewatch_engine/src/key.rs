use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Longest snapshot filename produced by [`derive_key`].
pub const MAX_KEY_LEN: usize = 127;

/// Deterministic, filesystem-safe snapshot name: `{sha256_hex(url)}_{sanitized_url}`,
/// truncated to [`MAX_KEY_LEN`] bytes.
///
/// Two long URLs that share a sanitized prefix still differ through the hash,
/// which always survives truncation intact.
pub fn derive_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut key = String::with_capacity(MAX_KEY_LEN);
    for byte in digest.iter() {
        let _ = write!(&mut key, "{byte:02x}");
    }
    key.push('_');
    key.push_str(&sanitize_url(url));
    // Only ASCII remains, so any byte index is a char boundary.
    key.truncate(MAX_KEY_LEN);
    key
}

/// Replaces every run of characters outside `[0-9A-Za-z_]` with one `_`.
fn sanitize_url(url: &str) -> String {
    let mut cleaned = String::with_capacity(url.len());
    let mut in_run = false;
    for c in url.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            cleaned.push(c);
            in_run = false;
        } else if !in_run {
            cleaned.push('_');
            in_run = true;
        }
    }
    cleaned
}
