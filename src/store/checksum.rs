//! CRC32 checksums for store lines
//!
//! Every line of a file store is prefixed with the CRC32 (IEEE) of its
//! payload. A mismatch is corruption.

use crc32fast::Hasher;

/// Computes the CRC32 of `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Returns `true` if `data` hashes to `expected`.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}

/// Formats a payload as a store line, without the trailing newline.
pub fn seal(payload: &str) -> String {
    format!("{:08x} {}", compute_checksum(payload.as_bytes()), payload)
}

/// Splits a store line into its payload, verifying the checksum.
///
/// Returns a description of the defect on failure.
pub fn unseal(line: &str) -> Result<&str, String> {
    let (prefix, payload) = line
        .split_once(' ')
        .ok_or_else(|| "missing checksum prefix".to_string())?;
    if prefix.len() != 8 {
        return Err(format!("malformed checksum '{}'", prefix));
    }
    let expected = u32::from_str_radix(prefix, 16).map_err(|_| format!("malformed checksum '{}'", prefix))?;
    if !verify_checksum(payload.as_bytes(), expected) {
        return Err(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            expected,
            compute_checksum(payload.as_bytes())
        ));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        let data = b"{\"revision\":1}";
        assert_eq!(compute_checksum(data), compute_checksum(data));
    }

    #[test]
    fn test_seal_then_unseal() {
        let line = seal("{\"revision\":7}");
        assert_eq!(unseal(&line).unwrap(), "{\"revision\":7}");
    }

    #[test]
    fn test_flipped_payload_detected() {
        let line = seal("{\"revision\":7}").replace('7', "8");
        let err = unseal(&line).unwrap_err();
        assert!(err.contains("checksum mismatch"));
    }

    #[test]
    fn test_missing_prefix_detected() {
        assert!(unseal("{}").is_err());
        assert!(unseal("xyz {}").is_err());
    }
}
