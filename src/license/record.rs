/// License record and signed assertion types
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{LicenseError, LicenseResult};

/// Date format used for `valid_from` / `valid_until`.
/// Parsing accepts unpadded months and days ("2000-1-1").
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The fields covered by a license signature.
///
/// `meta` is opaque key-value data. Its iteration order carries no meaning:
/// canonicalization always visits it by sorted key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Assigned by the issuer; absent on generate requests.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, serialize_with = "serialize_sorted")]
    pub meta: HashMap<String, String>,

    #[serde(default)]
    pub valid_from: String,

    #[serde(default)]
    pub valid_until: String,
}

/// A license record together with the signature claimed by its issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseAssertion {
    pub license: LicenseRecord,
    /// Lowercase hex HMAC-SHA256 digest.
    pub signature: String,
}

impl LicenseRecord {
    pub fn new(
        id: impl Into<String>,
        valid_from: impl Into<String>,
        valid_until: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            meta: HashMap::new(),
            valid_from: valid_from.into(),
            valid_until: valid_until.into(),
        }
    }

    /// Adds a metadata entry, replacing any previous value for `key`.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Checks that the record can be signed.
    ///
    /// Every value that ends up in the canonical string must be present and
    /// free of the newline separator, otherwise two different records could
    /// share one canonical form.
    ///
    /// # Errors
    /// * `InvalidInput` if `id`, `valid_from` or `valid_until` is missing or empty
    /// * `UnsafeFieldValue` if a canonicalized value contains `\n`
    pub fn check_signable(&self) -> LicenseResult<()> {
        let id = self.id.as_deref().unwrap_or_default();
        for (field, value) in [
            ("valid_from", self.valid_from.as_str()),
            ("valid_until", self.valid_until.as_str()),
            ("id", id),
        ] {
            if value.is_empty() {
                return Err(LicenseError::InvalidInput(format!("license is missing `{field}`")));
            }
            reject_separator(field, value)?;
        }

        for (key, value) in &self.meta {
            reject_separator(&format!("meta.{key}"), value)?;
        }

        Ok(())
    }

    /// Parses the validity window as calendar dates.
    ///
    /// # Errors
    /// `InvalidDate` naming the first field that does not parse.
    pub fn validity_window(&self) -> LicenseResult<(NaiveDate, NaiveDate)> {
        Ok((parse_date(&self.valid_from)?, parse_date(&self.valid_until)?))
    }
}

/// Parses a `%Y-%m-%d` date.
pub fn parse_date(value: &str) -> LicenseResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| LicenseError::InvalidDate(value.to_string()))
}

fn reject_separator(field: &str, value: &str) -> LicenseResult<()> {
    if value.contains('\n') {
        return Err(LicenseError::UnsafeFieldValue {
            field: field.to_string(),
        });
    }
    Ok(())
}

// Keeps encoded envelopes byte-stable for the same record.
fn serialize_sorted<S: Serializer>(
    meta: &HashMap<String, String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    meta.iter().collect::<BTreeMap<_, _>>().serialize(serializer)
}
