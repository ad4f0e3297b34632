//! Opaque per-job token generation.
//!
//! A token namespaces every artifact and status entry for one job. Tokens
//! are random hex strings with 64 bits of entropy; no uniqueness check is
//! performed against existing artifacts (collision probability is treated
//! as negligible).

use rand::RngCore;

/// Number of random bytes per token (16 hex characters).
pub const TOKEN_BYTES: usize = 8;

/// Generate a new job token: `TOKEN_BYTES` random bytes, hex-encoded.
pub fn generate() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
