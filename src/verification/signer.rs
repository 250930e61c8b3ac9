/// Signing and verification of license records
use super::hmac::{create_signature, verify_signature};
use crate::error::LicenseResult;
use crate::license::{LicenseAssertion, LicenseRecord, canonicalize};

/// Signs `record` with `secret`.
///
/// Returns the 64-character lowercase hex HMAC-SHA256 of the record's
/// canonical form.
///
/// # Errors
/// * `InvalidInput` if the secret is empty or a required field is missing
/// * `UnsafeFieldValue` if a signed field contains a newline
///
/// ```
/// use license_server::{LicenseAssertion, LicenseRecord, sign, verify};
///
/// let license = LicenseRecord::new("test", "2000-1-1", "3000-1-1");
/// let signature = sign(&license, b"SECRET").unwrap();
/// assert_eq!(
///     signature,
///     "eac2d226f0451c2d9536791d8641224aeaf290ccff13ad1d14bf1ce68c2c2f2d"
/// );
///
/// let assertion = LicenseAssertion { license, signature };
/// assert!(verify(&assertion, b"SECRET").unwrap());
/// ```
pub fn sign(record: &LicenseRecord, secret: &[u8]) -> LicenseResult<String> {
    record.check_signable()?;
    create_signature(canonicalize(record).as_bytes(), secret)
}

/// Checks the claimed signature of `assertion` against `secret`.
///
/// `Ok(false)` means the license was signed with another secret or altered
/// after signing. Errors are reserved for inputs that could never verify.
pub fn verify(assertion: &LicenseAssertion, secret: &[u8]) -> LicenseResult<bool> {
    let record = &assertion.license;
    record.check_signable()?;
    verify_signature(canonicalize(record).as_bytes(), secret, &assertion.signature)
}
