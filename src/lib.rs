/// License library - HMAC signing, envelopes, validation and the license server
pub mod config;
pub mod envelope;
pub mod error;
pub mod license;
pub mod server;
pub mod validate;
pub mod verification;

pub use error::{LicenseError, LicenseResult};
pub use license::{LicenseAssertion, LicenseRecord, canonicalize};
pub use validate::{Verdict, validate_assertion, validate_encoded};
pub use verification::{sign, verify};
