use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};

pub fn sha256_hex(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    hex::encode(digest)
}

pub fn verify_sha256(payload: &[u8], expected_hex: &str) -> Result<bool> {
    let expected = expected_hex.trim().to_ascii_lowercase();
    if expected.len() != 64 || hex::decode(&expected).is_err() {
        return Err(anyhow!(
            "invalid SHA-256 digest: expected 64 hex characters, got '{expected_hex}'"
        ));
    }
    Ok(sha256_hex(payload) == expected)
}

/// Checks a downloaded package against the size and digest its manifest
/// declares. Either check is skipped when the manifest leaves it out.
pub fn verify_package(
    payload: &[u8],
    expected_size: Option<u64>,
    expected_sha256: Option<&str>,
) -> Result<()> {
    if let Some(expected_size) = expected_size {
        let actual = payload.len() as u64;
        if actual != expected_size {
            return Err(anyhow!(
                "package size mismatch: expected {expected_size} bytes, got {actual}"
            ));
        }
    }
    if let Some(expected_sha256) = expected_sha256 {
        if !verify_sha256(payload, expected_sha256)? {
            return Err(anyhow!(
                "package sha256 mismatch: expected {expected_sha256}, got {}",
                sha256_hex(payload)
            ));
        }
    }
    Ok(())
}
