/// Remote license validation against a running license server
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{LicenseError, LicenseResult};
use crate::server::{EncodedLicense, ErrorMessage, ResultMessage};

/// Request timeout for remote validation.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Answer of a remote license server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteVerdict {
    Valid,
    /// The server refused the license; `message` is its error code.
    Rejected { message: String },
}

/// Build the validate endpoint URL from a server base URL
fn validate_url(server_url: &str) -> String {
    let clean_url = server_url.trim_end_matches('/');
    if clean_url.ends_with("/validate") {
        clean_url.to_string()
    } else {
        format!("{clean_url}/validate")
    }
}

/// Validate an encoded license with a license server
///
/// # Arguments
/// * `server_url` - Base URL of the server (or its full `/validate` URL)
/// * `encoded` - Base64 license envelope
///
/// # Returns
/// The server's verdict. Transport failures and unexpected responses are
/// `LicenseError::Network`.
pub fn validate_remote(server_url: &str, encoded: &str) -> LicenseResult<RemoteVerdict> {
    let url = validate_url(server_url);

    let client = reqwest::blocking::Client::builder()
        .timeout(REMOTE_TIMEOUT)
        .build()
        .map_err(|e| LicenseError::Network(format!("failed to create HTTP client: {e}")))?;

    debug!(%url, "validating license remotely");

    let response = client
        .post(&url)
        .json(&EncodedLicense {
            license: encoded.trim().to_string(),
        })
        .send()
        .map_err(|e| LicenseError::Network(format!("HTTP request failed: {e}")))?;

    match response.status() {
        StatusCode::OK => {
            let body: ResultMessage = response
                .json()
                .map_err(|e| LicenseError::Network(format!("failed to parse response: {e}")))?;
            debug!(result = %body.result, "license server accepted license");
            Ok(RemoteVerdict::Valid)
        }
        StatusCode::BAD_REQUEST => {
            let body: ErrorMessage = response
                .json()
                .map_err(|e| LicenseError::Network(format!("failed to parse response: {e}")))?;
            warn!(message = %body.message, "license server rejected license");
            Ok(RemoteVerdict::Rejected {
                message: body.message,
            })
        }
        status => Err(LicenseError::Network(format!(
            "unexpected response status {status} from {url}"
        ))),
    }
}
