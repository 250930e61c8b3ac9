/// License issuing: fill defaults, assign an id, sign and encode
use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use super::record::{DATE_FORMAT, LicenseAssertion, LicenseRecord};
use crate::envelope;
use crate::error::{LicenseError, LicenseResult};
use crate::verification::sign;

/// Validity of a license when no end date is requested.
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// What the issuer asks for. Missing dates fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub meta: HashMap<String, String>,
}

/// A freshly signed license and its transport encoding.
#[derive(Debug, Clone)]
pub struct IssuedLicense {
    pub assertion: LicenseAssertion,
    pub encoded: String,
}

/// Issues a new license.
///
/// # Arguments
/// * `request` - Requested window and metadata
/// * `secret` - Shared HMAC secret
/// * `today` - Start date used when `valid_from` is not given
///
/// # Returns
/// The signed assertion with a new v4 UUID as `id`, and its envelope
pub fn issue(
    request: IssueRequest,
    secret: &[u8],
    today: NaiveDate,
) -> LicenseResult<IssuedLicense> {
    let valid_from = request.valid_from.unwrap_or(today);
    let valid_until = match request.valid_until {
        Some(until) => until,
        None => valid_from
            .checked_add_signed(Duration::days(DEFAULT_VALIDITY_DAYS))
            .ok_or_else(|| {
                LicenseError::InvalidInput(format!(
                    "no {DEFAULT_VALIDITY_DAYS} day window fits after {valid_from}"
                ))
            })?,
    };

    if valid_until < valid_from {
        return Err(LicenseError::InvalidInput(format!(
            "valid_until {valid_until} is before valid_from {valid_from}"
        )));
    }

    let license = LicenseRecord {
        id: Some(Uuid::new_v4().to_string()),
        meta: request.meta,
        valid_from: valid_from.format(DATE_FORMAT).to_string(),
        valid_until: valid_until.format(DATE_FORMAT).to_string(),
    };
    let signature = sign(&license, secret)?;
    let assertion = LicenseAssertion { license, signature };
    let encoded = envelope::encode(&assertion)?;

    debug!(
        id = assertion.license.id.as_deref().unwrap_or_default(),
        valid_from = %assertion.license.valid_from,
        valid_until = %assertion.license.valid_until,
        "issued license"
    );

    Ok(IssuedLicense { assertion, encoded })
}

/// Parses a `KEY=value` metadata argument.
pub fn parse_meta_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
