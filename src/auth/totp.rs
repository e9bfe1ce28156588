//! Time-based one-time code generation for the two-factor challenge
//!
//! The platform issues 80-bit base32 secrets, shorter than the RFC 4226
//! recommended minimum, so the unchecked constructor is used; the checked
//! one rejects secrets under 128 bits.

use crate::{Error, Result};
use totp_rs::{Algorithm, Secret, TOTP};

/// Standard one-time code parameters used by the platform
const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP: u64 = 30;

/// Generate a one-time code for the current time window
pub fn generate_code(secret: &str) -> Result<String> {
    let totp = build(secret)?;
    totp.generate_current()
        .map_err(|e| Error::otp(format!("System clock error: {}", e)))
}

/// Generate a one-time code for the given Unix timestamp
pub fn generate_code_at(secret: &str, timestamp: u64) -> Result<String> {
    Ok(build(secret)?.generate(timestamp))
}

fn build(secret: &str) -> Result<TOTP> {
    let bytes = Secret::Encoded(secret.trim().to_string())
        .to_bytes()
        .map_err(|e| Error::otp(format!("Invalid base32 secret: {:?}", e)))?;
    Ok(TOTP::new_unchecked(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP,
        bytes,
    ))
}
