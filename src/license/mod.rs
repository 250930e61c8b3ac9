/// License module - Records, canonical form and issuing
pub mod canonical;
pub mod issue;
pub mod record;

pub use canonical::{FIELD_SEPARATOR, canonicalize};
pub use issue::{DEFAULT_VALIDITY_DAYS, IssueRequest, IssuedLicense, issue, parse_meta_pair};
pub use record::{DATE_FORMAT, LicenseAssertion, LicenseRecord, parse_date};
