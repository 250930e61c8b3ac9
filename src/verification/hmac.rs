/// HMAC-SHA256 signature generation and validation
use ::hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{LicenseError, LicenseResult};

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded HMAC-SHA256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Create HMAC-SHA256 signature
///
/// # Arguments
/// * `data` - Data to sign (the canonical form of a license)
/// * `secret` - Shared secret key, must not be empty
///
/// # Returns
/// Lowercase hex-encoded HMAC signature
pub fn create_signature(data: &[u8], secret: &[u8]) -> LicenseResult<String> {
    if secret.is_empty() {
        return Err(LicenseError::InvalidInput("secret must not be empty".to_string()));
    }
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| LicenseError::InvalidInput(format!("unusable HMAC key: {e}")))?;
    mac.update(data);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify HMAC signature
///
/// # Arguments
/// * `data` - Original data that was signed
/// * `secret` - Shared secret key
/// * `signature` - Signature to verify (hex-encoded)
///
/// # Returns
/// true if signature is valid
pub fn verify_signature(data: &[u8], secret: &[u8], signature: &str) -> LicenseResult<bool> {
    let expected = create_signature(data, secret)?;

    // Running time depends only on the lengths, never on the first mismatch.
    Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
}
