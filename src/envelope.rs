/// Transport encoding of license assertions
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

use crate::error::{LicenseError, LicenseResult};
use crate::license::LicenseAssertion;

const ENVELOPE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes an assertion as a base64 envelope.
///
/// The envelope is standard base64 over the assertion's JSON,
/// `{"license":{"id":..,"meta":{..},"valid_from":..,"valid_until":..},"signature":..}`.
pub fn encode(assertion: &LicenseAssertion) -> LicenseResult<String> {
    let json = serde_json::to_vec(assertion)?;
    Ok(ENVELOPE.encode(json))
}

/// Decodes a base64 envelope into an assertion.
///
/// Missing padding and surrounding whitespace are tolerated, as keys are
/// often copied out of terminals and emails.
///
/// # Errors
/// `MalformedAssertion` if the input is not base64, not UTF-8, or not an
/// assertion document. The signature is not checked here.
pub fn decode(encoded: &str) -> LicenseResult<LicenseAssertion> {
    let bytes = ENVELOPE
        .decode(encoded.trim())
        .map_err(|e| LicenseError::MalformedAssertion(format!("invalid base64: {e}")))?;
    let json = std::str::from_utf8(&bytes)
        .map_err(|e| LicenseError::MalformedAssertion(format!("invalid UTF-8: {e}")))?;
    serde_json::from_str(json)
        .map_err(|e| LicenseError::MalformedAssertion(format!("invalid assertion JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::LicenseRecord;

    const VECTOR: &str = "eyJsaWNlbnNlIjp7ImlkIjoidGVzdCIsIm1ldGEiOnt9LCJ2YWxpZF9mcm9tIjoiMjAwMC0xLTEiLCJ2YWxpZF91bnRpbCI6IjMwMDAtMS0xIn0sInNpZ25hdHVyZSI6ImVhYzJkMjI2ZjA0NTFjMmQ5NTM2NzkxZDg2NDEyMjRhZWFmMjkwY2NmZjEzYWQxZDE0YmYxY2U2OGMyYzJmMmQifQ==";

    #[test]
    fn test_decode_reference_envelope() {
        let assertion = decode(VECTOR).unwrap();
        assert_eq!(assertion.license.id.as_deref(), Some("test"));
        assert!(assertion.license.meta.is_empty());
        assert_eq!(assertion.license.valid_from, "2000-1-1");
        assert_eq!(assertion.license.valid_until, "3000-1-1");
        assert_eq!(
            assertion.signature,
            "eac2d226f0451c2d9536791d8641224aeaf290ccff13ad1d14bf1ce68c2c2f2d"
        );
    }

    #[test]
    fn test_encode_reproduces_reference_envelope() {
        let assertion = LicenseAssertion {
            license: LicenseRecord::new("test", "2000-1-1", "3000-1-1"),
            signature: "eac2d226f0451c2d9536791d8641224aeaf290ccff13ad1d14bf1ce68c2c2f2d".into(),
        };
        assert_eq!(encode(&assertion).unwrap(), VECTOR);
    }

    #[test]
    fn test_decode_tolerates_whitespace_and_missing_padding() {
        let padded = format!("{VECTOR} \n");
        assert!(decode(&padded).is_ok());
        assert!(decode(VECTOR.trim_end_matches('=')).is_ok());
    }

    #[test]
    fn test_malformed_envelopes() {
        for bad in ["not base64!", "", "bm90IGpzb24=", "e30="] {
            assert!(
                matches!(decode(bad), Err(LicenseError::MalformedAssertion(_))),
                "{bad:?}"
            );
        }

        let not_utf8 = ENVELOPE.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode(&not_utf8), Err(LicenseError::MalformedAssertion(_))));
    }
}
