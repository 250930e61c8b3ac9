/// Full license validation: envelope, signature, then validity window
use chrono::NaiveDate;
use tracing::debug;

use crate::envelope;
use crate::error::LicenseResult;
use crate::license::LicenseAssertion;
use crate::verification::verify;

/// Outcome of validating a well-formed license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// Signature does not match: wrong secret or tampered fields.
    BadSignature,
    NotYetActive { starts: NaiveDate },
    Expired { ended: NaiveDate },
}

impl Verdict {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::BadSignature => write!(f, "invalid signature"),
            Self::NotYetActive { starts } => write!(f, "not active until {starts}"),
            Self::Expired { ended } => write!(f, "expired on {ended}"),
        }
    }
}

/// Validates an already decoded assertion on `today`.
///
/// The signature is checked before the dates are parsed, so a forged
/// license never reaches date handling.
pub fn validate_assertion(
    assertion: &LicenseAssertion,
    secret: &[u8],
    today: NaiveDate,
) -> LicenseResult<Verdict> {
    if !verify(assertion, secret)? {
        return Ok(Verdict::BadSignature);
    }

    let (from, until) = assertion.license.validity_window()?;
    let verdict = if today < from {
        Verdict::NotYetActive { starts: from }
    } else if today > until {
        Verdict::Expired { ended: until }
    } else {
        Verdict::Valid
    };
    Ok(verdict)
}

/// Decodes and validates a base64 envelope on `today`.
///
/// # Errors
/// * `MalformedAssertion` if the envelope cannot be decoded
/// * `InvalidInput` / `UnsafeFieldValue` if the record cannot be verified
/// * `InvalidDate` if a correctly signed record carries unparsable dates
pub fn validate_encoded(encoded: &str, secret: &[u8], today: NaiveDate) -> LicenseResult<Verdict> {
    let assertion = envelope::decode(encoded)?;
    let verdict = validate_assertion(&assertion, secret, today)?;
    debug!(
        id = assertion.license.id.as_deref().unwrap_or_default(),
        %verdict,
        "validated license"
    );
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicenseError;
    use crate::license::LicenseRecord;
    use crate::verification::sign;

    const VECTOR: &str = "eyJsaWNlbnNlIjp7ImlkIjoidGVzdCIsIm1ldGEiOnt9LCJ2YWxpZF9mcm9tIjoiMjAwMC0xLTEiLCJ2YWxpZF91bnRpbCI6IjMwMDAtMS0xIn0sInNpZ25hdHVyZSI6ImVhYzJkMjI2ZjA0NTFjMmQ5NTM2NzkxZDg2NDEyMjRhZWFmMjkwY2NmZjEzYWQxZDE0YmYxY2U2OGMyYzJmMmQifQ==";

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assertion(from: &str, until: &str) -> LicenseAssertion {
        let license = LicenseRecord::new("lic-1", from, until);
        let signature = sign(&license, b"SECRET").unwrap();
        LicenseAssertion { license, signature }
    }

    #[test]
    fn test_reference_envelope_is_valid() {
        let verdict = validate_encoded(VECTOR, b"SECRET", day(2024, 6, 1)).unwrap();
        assert_eq!(verdict, Verdict::Valid);
    }

    #[test]
    fn test_reference_envelope_with_wrong_secret() {
        let verdict = validate_encoded(VECTOR, b"WRONG", day(2024, 6, 1)).unwrap();
        assert_eq!(verdict, Verdict::BadSignature);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let a = assertion("2024-01-01", "2024-01-31");
        assert_eq!(validate_assertion(&a, b"SECRET", day(2024, 1, 1)).unwrap(), Verdict::Valid);
        assert_eq!(validate_assertion(&a, b"SECRET", day(2024, 1, 31)).unwrap(), Verdict::Valid);
        assert_eq!(
            validate_assertion(&a, b"SECRET", day(2023, 12, 31)).unwrap(),
            Verdict::NotYetActive { starts: day(2024, 1, 1) }
        );
        assert_eq!(
            validate_assertion(&a, b"SECRET", day(2024, 2, 1)).unwrap(),
            Verdict::Expired { ended: day(2024, 1, 31) }
        );
    }

    #[test]
    fn test_signature_checked_before_dates() {
        let mut forged = assertion("not-a-date", "2024-01-31");
        forged.signature = "00".repeat(32);
        assert_eq!(
            validate_assertion(&forged, b"SECRET", day(2024, 1, 1)).unwrap(),
            Verdict::BadSignature
        );

        let signed_garbage = assertion("not-a-date", "2024-01-31");
        assert!(matches!(
            validate_assertion(&signed_garbage, b"SECRET", day(2024, 1, 1)),
            Err(LicenseError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_malformed_envelope_is_an_error() {
        assert!(matches!(
            validate_encoded("%%%", b"SECRET", day(2024, 1, 1)),
            Err(LicenseError::MalformedAssertion(_))
        ));
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Valid.to_string(), "valid");
        assert_eq!(
            Verdict::Expired { ended: day(2024, 1, 31) }.to_string(),
            "expired on 2024-01-31"
        );
    }
}
