/// Request and response bodies of the license server
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LicenseResult;
use crate::license::{IssueRequest, parse_date};

/// Header carrying the key that authorizes `/generate`.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Body of `POST /validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedLicense {
    /// Base64 license envelope.
    pub license: String,
}

/// Successful response: `{"result": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    pub result: String,
}

/// Error response: `{"code": 400, "message": "INVALID_LICENSE"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: u16,
    pub message: String,
}

/// Body of `POST /generate`.
///
/// Dates default like the CLI does. A client-supplied `id` is ignored: the
/// server always assigns a fresh one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl GenerateRequest {
    pub fn into_issue_request(self) -> LicenseResult<IssueRequest> {
        Ok(IssueRequest {
            valid_from: self.valid_from.as_deref().map(parse_date).transpose()?,
            valid_until: self.valid_until.as_deref().map(parse_date).transpose()?,
            meta: self.meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_generate_request_ignores_id() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{"id":null,"meta":{},"valid_from":"2000-1-1","valid_until":"3000-1-1"}"#,
        )
        .unwrap();
        let issue = request.into_issue_request().unwrap();
        assert_eq!(issue.valid_from, NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(issue.valid_until, NaiveDate::from_ymd_opt(3000, 1, 1));
    }

    #[test]
    fn test_generate_request_defaults() {
        let request: GenerateRequest = serde_json::from_str("{}").unwrap();
        let issue = request.into_issue_request().unwrap();
        assert!(issue.valid_from.is_none());
        assert!(issue.meta.is_empty());
    }

    #[test]
    fn test_generate_request_bad_date() {
        let request = GenerateRequest {
            valid_from: Some("soon".into()),
            ..Default::default()
        };
        assert!(request.into_issue_request().is_err());
    }
}
