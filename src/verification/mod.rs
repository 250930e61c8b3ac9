/// Verification module - HMAC signing and verification of licenses
pub mod hmac;
pub mod network;
pub mod secret;
pub mod signer;

pub use self::hmac::{SIGNATURE_HEX_LEN, create_signature, verify_signature};
pub use network::{RemoteVerdict, validate_remote};
pub use secret::generate_shared_secret;
pub use signer::{sign, verify};
