//! Shared-secret check that gates every relay request.

/// Compare the key a caller presented against the configured key.
///
/// Runs in time independent of where the two keys first differ. An empty
/// configured key never authenticates.
pub fn authenticate(provided: &str, configured: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    constant_time_eq(provided.as_bytes(), configured.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
