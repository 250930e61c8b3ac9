/// Shared secret generation
use rand::random;

/// Size of a generated secret in bytes.
pub const SECRET_BYTES: usize = 32;

/// Generates a random shared secret for HMAC signing, hex-encoded.
pub fn generate_shared_secret() -> String {
    let bytes: [u8; SECRET_BYTES] = random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_format() {
        let secret = generate_shared_secret();
        assert_eq!(secret.len(), SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_shared_secret());
    }
}
